//! Game world types.
//!
//! Contains the types for representing game state: the player character,
//! monsters, items, scenes, quests, the story log, and the complete
//! [`GameState`] snapshot produced anew each turn.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a game (one saved adventure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for the player character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a monster instance in combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub Uuid);

impl MonsterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MonsterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Current unix time in whole seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ============================================================================
// Ability Scores
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn standard_array() -> Self {
        Self::new(15, 14, 13, 12, 10, 8)
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// Ability modifier. Floor division handles scores below 10 correctly:
    /// 8-9 is -1, 10-11 is 0, 12-13 is +1, and so on.
    pub fn modifier(&self, ability: Ability) -> i32 {
        (self.get(ability) as i32 - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

// ============================================================================
// Skills
// ============================================================================

/// Skills a character can be proficient in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Athletics,
    Acrobatics,
    SleightOfHand,
    Stealth,
    Arcana,
    History,
    Investigation,
    Nature,
    Religion,
    AnimalHandling,
    Insight,
    Medicine,
    Perception,
    Survival,
    Deception,
    Intimidation,
    Performance,
    Persuasion,
}

const ALL_SKILLS: [Skill; 18] = [
    Skill::Athletics,
    Skill::Acrobatics,
    Skill::SleightOfHand,
    Skill::Stealth,
    Skill::Arcana,
    Skill::History,
    Skill::Investigation,
    Skill::Nature,
    Skill::Religion,
    Skill::AnimalHandling,
    Skill::Insight,
    Skill::Medicine,
    Skill::Perception,
    Skill::Survival,
    Skill::Deception,
    Skill::Intimidation,
    Skill::Performance,
    Skill::Persuasion,
];

impl Skill {
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Strength,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Dexterity,
            Skill::Arcana
            | Skill::History
            | Skill::Investigation
            | Skill::Nature
            | Skill::Religion => Ability::Intelligence,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Perception
            | Skill::Survival => Ability::Wisdom,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Charisma
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Athletics => "Athletics",
            Skill::Acrobatics => "Acrobatics",
            Skill::SleightOfHand => "Sleight of Hand",
            Skill::Stealth => "Stealth",
            Skill::Arcana => "Arcana",
            Skill::History => "History",
            Skill::Investigation => "Investigation",
            Skill::Nature => "Nature",
            Skill::Religion => "Religion",
            Skill::AnimalHandling => "Animal Handling",
            Skill::Insight => "Insight",
            Skill::Medicine => "Medicine",
            Skill::Perception => "Perception",
            Skill::Survival => "Survival",
            Skill::Deception => "Deception",
            Skill::Intimidation => "Intimidation",
            Skill::Performance => "Performance",
            Skill::Persuasion => "Persuasion",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Skill> {
        let lower = name.trim().to_lowercase();
        ALL_SKILLS
            .iter()
            .copied()
            .find(|s| s.name().to_lowercase() == lower)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Hit Points
// ============================================================================

/// Hit points tracking. Current stays within `0..=maximum`; temporary hit
/// points absorb damage before current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    pub maximum: i32,
    pub temporary: i32,
}

impl HitPoints {
    pub fn new(maximum: i32) -> Self {
        Self {
            current: maximum,
            maximum,
            temporary: 0,
        }
    }

    /// Apply damage, temporary hit points first. Current never drops below 0.
    pub fn take_damage(&mut self, amount: i32) -> DamageResult {
        let amount = amount.max(0);
        let absorbed = amount.min(self.temporary);
        self.temporary -= absorbed;

        let to_current = (amount - absorbed).min(self.current);
        self.current -= to_current;

        DamageResult {
            absorbed_by_temporary: absorbed,
            hit_points_lost: to_current,
            dropped_to_zero: self.current == 0 && to_current > 0,
        }
    }

    /// Heal up to the maximum. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.current;
        self.current = (self.current + amount.max(0)).min(self.maximum);
        self.current - old
    }

    pub fn add_temporary(&mut self, amount: i32) {
        self.temporary = self.temporary.max(amount);
    }

    /// Raise the maximum and heal by the same amount (used when leveling up).
    pub fn raise_maximum(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.maximum += amount;
        self.current = (self.current + amount).min(self.maximum);
    }

    /// Restore `0 <= current <= maximum` after any external mutation.
    pub fn clamp(&mut self) {
        self.current = self.current.clamp(0, self.maximum);
        self.temporary = self.temporary.max(0);
    }

    pub fn is_unconscious(&self) -> bool {
        self.current <= 0
    }
}

/// Result of taking damage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    pub absorbed_by_temporary: i32,
    pub hit_points_lost: i32,
    pub dropped_to_zero: bool,
}

/// Death saving throws, each counter in `0..=3`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
}

impl DeathSaves {
    /// Record successes. Returns true when the third is reached.
    pub fn add_successes(&mut self, count: u8) -> bool {
        self.successes = (self.successes + count).min(3);
        self.successes >= 3
    }

    /// Record failures. Returns true when the third is reached.
    pub fn add_failures(&mut self, count: u8) -> bool {
        self.failures = (self.failures + count).min(3);
        self.failures >= 3
    }

    pub fn reset(&mut self) {
        self.successes = 0;
        self.failures = 0;
    }
}

// ============================================================================
// Items and Inventory
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Scroll,
    Trinket,
}

impl ItemType {
    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Armor => "armor",
            ItemType::Consumable => "consumable",
            ItemType::Scroll => "scroll",
            ItemType::Trinket => "trinket",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl ItemRarity {
    pub fn name(&self) -> &'static str {
        match self {
            ItemRarity::Common => "common",
            ItemRarity::Rare => "rare",
            ItemRarity::Epic => "epic",
            ItemRarity::Legendary => "legendary",
        }
    }
}

/// What happens when an item is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Restore hit points by rolling the notation.
    Healing { notation: String },
    /// Grant temporary hit points.
    TemporaryHitPoints { amount: i32 },
    /// No mechanical effect, flavor only.
    None,
}

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub item_type: ItemType,
    pub rarity: ItemRarity,
    pub quantity: u32,
    pub description: String,
    /// Damage notation for weapons, e.g. `1d8`.
    pub damage: Option<String>,
    pub damage_type: Option<String>,
    pub effect: ItemEffect,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
            rarity: ItemRarity::Common,
            quantity: 1,
            description: String::new(),
            damage: None,
            damage_type: None,
            effect: ItemEffect::None,
        }
    }

    pub fn with_rarity(mut self, rarity: ItemRarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_damage(mut self, notation: impl Into<String>, damage_type: impl Into<String>) -> Self {
        self.damage = Some(notation.into());
        self.damage_type = Some(damage_type.into());
        self
    }

    pub fn with_effect(mut self, effect: ItemEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn is_consumable(&self) -> bool {
        matches!(self.item_type, ItemType::Consumable | ItemType::Scroll)
    }
}

/// Character inventory with a fixed capacity counted in total units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Item>,
    pub capacity: u32,
}

pub const DEFAULT_INVENTORY_CAPACITY: u32 = 20;

impl Default for Inventory {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            capacity: DEFAULT_INVENTORY_CAPACITY,
        }
    }
}

impl Inventory {
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.total_quantity())
    }

    /// Add up to `item.quantity` units, limited by remaining capacity.
    /// Returns the quantity actually added; excess is dropped silently.
    pub fn add_item(&mut self, mut item: Item) -> u32 {
        let added = item.quantity.min(self.remaining_capacity());
        if added == 0 {
            return 0;
        }
        item.quantity = added;

        let name_lower = item.name.to_lowercase();
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.name.to_lowercase() == name_lower)
        {
            existing.quantity += added;
        } else {
            self.items.push(item);
        }
        added
    }

    /// Remove a quantity of an item. Name matching is case-insensitive.
    /// Returns false when the item is missing or the quantity is short.
    pub fn remove_item(&mut self, name: &str, quantity: u32) -> bool {
        let name_lower = name.to_lowercase();
        if let Some(idx) = self
            .items
            .iter()
            .position(|i| i.name.to_lowercase() == name_lower)
        {
            if self.items[idx].quantity >= quantity {
                self.items[idx].quantity -= quantity;
                if self.items[idx].quantity == 0 {
                    self.items.remove(idx);
                }
                return true;
            }
        }
        false
    }

    /// Find an item by name, case-insensitively.
    pub fn find_item(&self, name: &str) -> Option<&Item> {
        let name_lower = name.to_lowercase();
        self.items
            .iter()
            .find(|i| i.name.to_lowercase() == name_lower)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.find_item(name).is_some()
    }
}

// ============================================================================
// Character
// ============================================================================

pub const MAX_LEVEL: u8 = 20;

/// The player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,

    pub ability_scores: AbilityScores,
    pub level: u8,
    pub experience: u32,

    pub hit_points: HitPoints,
    pub death_saves: DeathSaves,

    pub armor_class: i32,
    pub conditions: Vec<String>,

    /// Die size used when gaining hit points on level up.
    pub hit_die_sides: u32,
    pub hit_dice_remaining: u8,

    pub proficient: HashSet<Skill>,
    pub expertise: HashSet<Skill>,

    /// Equipped weapon damage notation, e.g. `1d8`.
    pub weapon_damage: String,
    pub weapon_damage_type: String,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            ability_scores: AbilityScores::standard_array(),
            level: 1,
            experience: 0,
            hit_points: HitPoints::new(12),
            death_saves: DeathSaves::default(),
            armor_class: 14,
            conditions: Vec::new(),
            hit_die_sides: 10,
            hit_dice_remaining: 1,
            proficient: HashSet::new(),
            expertise: HashSet::new(),
            weapon_damage: "1d8".to_string(),
            weapon_damage_type: "slashing".to_string(),
        }
    }

    /// Proficiency bonus by level: 1-4 is +2, stepping up to +6 at 17+.
    pub fn proficiency_bonus(&self) -> i32 {
        match self.level {
            0..=4 => 2,
            5..=8 => 3,
            9..=12 => 4,
            13..=16 => 5,
            _ => 6,
        }
    }

    pub fn initiative_modifier(&self) -> i32 {
        self.ability_scores.modifier(Ability::Dexterity)
    }

    pub fn skill_modifier(&self, skill: Skill) -> i32 {
        let ability_mod = self.ability_scores.modifier(skill.ability());
        let proficiency = if self.expertise.contains(&skill) {
            self.proficiency_bonus() * 2
        } else if self.proficient.contains(&skill) {
            self.proficiency_bonus()
        } else {
            0
        };
        ability_mod + proficiency
    }

    pub fn attack_bonus(&self) -> i32 {
        self.ability_scores.modifier(Ability::Strength) + self.proficiency_bonus()
    }

    pub fn is_conscious(&self) -> bool {
        self.hit_points.current > 0
    }

    /// Alive means conscious, or unconscious with fewer than three failed
    /// death saves.
    pub fn is_alive(&self) -> bool {
        self.hit_points.current > 0 || self.death_saves.failures < 3
    }
}

// ============================================================================
// Monsters
// ============================================================================

/// An attack a monster can make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterAction {
    pub name: String,
    pub attack_bonus: i32,
    pub damage_notation: String,
    pub damage_type: String,
    pub save_dc: Option<i32>,
}

/// A monster instance in play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub kind: String,
    pub ability_scores: AbilityScores,
    pub armor_class: i32,
    pub hit_points: HitPoints,
    pub challenge_rating: f32,
    pub resistances: Vec<String>,
    pub immunities: Vec<String>,
    pub vulnerabilities: Vec<String>,
    pub actions: Vec<MonsterAction>,
    pub experience_value: u32,
}

impl Monster {
    pub fn initiative_modifier(&self) -> i32 {
        self.ability_scores.modifier(Ability::Dexterity)
    }

    pub fn is_defeated(&self) -> bool {
        self.hit_points.current <= 0
    }

    fn tag_matches(tags: &[String], damage_type: &str) -> bool {
        let lower = damage_type.to_lowercase();
        tags.iter().any(|t| t.to_lowercase() == lower)
    }

    pub fn is_immune_to(&self, damage_type: &str) -> bool {
        Self::tag_matches(&self.immunities, damage_type)
    }

    pub fn is_resistant_to(&self, damage_type: &str) -> bool {
        Self::tag_matches(&self.resistances, damage_type)
    }

    pub fn is_vulnerable_to(&self, damage_type: &str) -> bool {
        Self::tag_matches(&self.vulnerabilities, damage_type)
    }
}

// ============================================================================
// Scenes and Quests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LocationKind {
    Town,
    Wilderness,
    Dungeon,
    Building,
    #[default]
    Other,
}

/// Where the party currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    pub description: String,
    pub location_kind: LocationKind,
    pub in_combat: bool,
}

impl Scene {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            location_kind: LocationKind::default(),
            in_combat: false,
        }
    }

    pub fn with_kind(mut self, kind: LocationKind) -> Self {
        self.location_kind = kind;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuestStatus {
    #[default]
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    pub description: String,
    pub status: QuestStatus,
}

impl Quest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: QuestStatus::Active,
        }
    }
}

// ============================================================================
// Story Log
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryKind {
    PlayerAction,
    Narration,
    Dialogue,
    CheckOutcome,
    Combat,
    System,
}

/// One entry in the append-only story log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEntry {
    pub kind: StoryKind,
    pub content: String,
    pub turn: u32,
}

impl fmt::Display for StoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            StoryKind::PlayerAction => "Player",
            StoryKind::Narration => "Narrator",
            StoryKind::Dialogue => "Dialogue",
            StoryKind::CheckOutcome => "Check",
            StoryKind::Combat => "Combat",
            StoryKind::System => "System",
        };
        write!(f, "[{}] {}", prefix, self.content)
    }
}

// ============================================================================
// Difficulty
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to monster damage against the player.
    pub fn damage_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }
}

// ============================================================================
// Game State
// ============================================================================

/// The full state of one adventure. Produced anew each turn; callers treat
/// prior snapshots as immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    pub adventure_name: String,
    pub character: Character,
    pub inventory: Inventory,
    pub gold: u32,
    pub quests: Vec<Quest>,
    pub scene: Scene,
    pub story_log: Vec<StoryEntry>,
    pub flags: HashMap<String, bool>,
    pub difficulty: Difficulty,
    pub turn: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

impl GameState {
    pub fn new(adventure_name: impl Into<String>, character: Character) -> Self {
        let now = unix_now();
        Self {
            id: GameId::new(),
            adventure_name: adventure_name.into(),
            character,
            inventory: Inventory::default(),
            gold: 25,
            quests: Vec::new(),
            scene: Scene::new("The Crossroads", "A dusty crossroads at the edge of town."),
            story_log: Vec::new(),
            flags: HashMap::new(),
            difficulty: Difficulty::default(),
            turn: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    /// Append a story entry stamped with the current turn.
    pub fn push_entry(&mut self, kind: StoryKind, content: impl Into<String>) {
        self.story_log.push(StoryEntry {
            kind,
            content: content.into(),
            turn: self.turn,
        });
    }

    pub fn recent_entries(&self, count: usize) -> &[StoryEntry] {
        let start = self.story_log.len().saturating_sub(count);
        &self.story_log[start..]
    }

    pub fn touch(&mut self) {
        self.updated_at = unix_now();
    }
}

/// Create a sample fighter for tests and demos.
pub fn create_sample_fighter(name: &str) -> Character {
    let mut character = Character::new(name);

    character.ability_scores = AbilityScores::new(16, 14, 14, 10, 12, 8);
    character.level = 3;
    character.hit_points = HitPoints::new(28);
    character.hit_die_sides = 10;
    character.hit_dice_remaining = 3;
    character.armor_class = 18;
    character.experience = 900;

    character.proficient.insert(Skill::Athletics);
    character.proficient.insert(Skill::Perception);
    character.proficient.insert(Skill::Intimidation);

    character.weapon_damage = "1d8+3".to_string();
    character.weapon_damage_type = "slashing".to_string();

    character
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_modifier() {
        let scores = AbilityScores::new(16, 14, 12, 10, 8, 6);
        assert_eq!(scores.modifier(Ability::Strength), 3);
        assert_eq!(scores.modifier(Ability::Dexterity), 2);
        assert_eq!(scores.modifier(Ability::Constitution), 1);
        assert_eq!(scores.modifier(Ability::Intelligence), 0);
        assert_eq!(scores.modifier(Ability::Wisdom), -1);
        assert_eq!(scores.modifier(Ability::Charisma), -2);

        // Odd scores below 10 exercise the floor division
        let odd = AbilityScores::new(9, 7, 5, 11, 13, 15);
        assert_eq!(odd.modifier(Ability::Strength), -1);
        assert_eq!(odd.modifier(Ability::Dexterity), -2);
        assert_eq!(odd.modifier(Ability::Constitution), -3);
        assert_eq!(odd.modifier(Ability::Intelligence), 0);
        assert_eq!(odd.modifier(Ability::Wisdom), 1);
        assert_eq!(odd.modifier(Ability::Charisma), 2);
    }

    #[test]
    fn test_temp_hp_absorbs_first() {
        let mut hp = HitPoints::new(20);
        hp.add_temporary(5);

        let result = hp.take_damage(8);
        assert_eq!(result.absorbed_by_temporary, 5);
        assert_eq!(result.hit_points_lost, 3);
        assert_eq!(hp.temporary, 0);
        assert_eq!(hp.current, 17);
    }

    #[test]
    fn test_temp_hp_fully_absorbs_small_hit() {
        let mut hp = HitPoints::new(20);
        hp.add_temporary(5);

        let result = hp.take_damage(3);
        assert_eq!(result.absorbed_by_temporary, 3);
        assert_eq!(result.hit_points_lost, 0);
        assert_eq!(hp.temporary, 2);
        assert_eq!(hp.current, 20);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut hp = HitPoints::new(10);
        let result = hp.take_damage(50);
        assert_eq!(hp.current, 0);
        assert!(result.dropped_to_zero);
        assert_eq!(result.hit_points_lost, 10);
    }

    #[test]
    fn test_heal_clamps_to_maximum() {
        let mut hp = HitPoints::new(20);
        hp.take_damage(5);
        let healed = hp.heal(100);
        assert_eq!(healed, 5);
        assert_eq!(hp.current, 20);
    }

    #[test]
    fn test_raise_maximum_heals_by_gain() {
        let mut hp = HitPoints::new(20);
        hp.take_damage(8);
        hp.raise_maximum(7);
        assert_eq!(hp.maximum, 27);
        assert_eq!(hp.current, 19);
    }

    #[test]
    fn test_death_save_counters_cap_at_three() {
        let mut saves = DeathSaves::default();
        assert!(!saves.add_failures(2));
        assert!(saves.add_failures(2));
        assert_eq!(saves.failures, 3);

        saves.reset();
        assert_eq!(saves.successes, 0);
        assert_eq!(saves.failures, 0);
    }

    #[test]
    fn test_character_proficiency() {
        let mut character = Character::new("Test");
        assert_eq!(character.proficiency_bonus(), 2);

        character.level = 5;
        assert_eq!(character.proficiency_bonus(), 3);

        character.level = 17;
        assert_eq!(character.proficiency_bonus(), 6);
    }

    #[test]
    fn test_skill_modifier_with_expertise() {
        let mut character = Character::new("Test");
        character.ability_scores.dexterity = 16;
        assert_eq!(character.skill_modifier(Skill::Stealth), 3);

        character.proficient.insert(Skill::Stealth);
        assert_eq!(character.skill_modifier(Skill::Stealth), 5);

        character.expertise.insert(Skill::Stealth);
        assert_eq!(character.skill_modifier(Skill::Stealth), 7);
    }

    #[test]
    fn test_skill_from_name() {
        assert_eq!(Skill::from_name("stealth"), Some(Skill::Stealth));
        assert_eq!(
            Skill::from_name("Sleight of Hand"),
            Some(Skill::SleightOfHand)
        );
        assert_eq!(Skill::from_name("juggling"), None);
    }

    #[test]
    fn test_inventory_case_insensitive_lookup() {
        let mut inv = Inventory::default();
        inv.add_item(Item {
            name: "Healing Potion".to_string(),
            item_type: ItemType::Consumable,
            rarity: ItemRarity::Common,
            quantity: 2,
            description: String::new(),
            damage: None,
            damage_type: None,
            effect: ItemEffect::Healing {
                notation: "2d4+2".to_string(),
            },
        });

        assert!(inv.has_item("healing potion"));
        assert!(inv.has_item("HEALING POTION"));
        assert!(inv.remove_item("Healing potion", 1));
        assert_eq!(inv.find_item("healing potion").unwrap().quantity, 1);
    }

    #[test]
    fn test_inventory_partial_fulfillment() {
        let mut inv = Inventory {
            items: Vec::new(),
            capacity: 3,
        };
        let added = inv.add_item(Item {
            name: "Torch".to_string(),
            item_type: ItemType::Trinket,
            rarity: ItemRarity::Common,
            quantity: 5,
            description: String::new(),
            damage: None,
            damage_type: None,
            effect: ItemEffect::None,
        });
        assert_eq!(added, 3);
        assert_eq!(inv.total_quantity(), 3);
        assert_eq!(inv.remaining_capacity(), 0);
    }

    #[test]
    fn test_inventory_remove_requires_quantity() {
        let mut inv = Inventory::default();
        inv.add_item(Item {
            name: "Rope".to_string(),
            item_type: ItemType::Trinket,
            rarity: ItemRarity::Common,
            quantity: 1,
            description: String::new(),
            damage: None,
            damage_type: None,
            effect: ItemEffect::None,
        });

        assert!(!inv.remove_item("Rope", 2));
        assert!(inv.remove_item("Rope", 1));
        assert!(!inv.has_item("Rope"));
    }

    #[test]
    fn test_monster_damage_tags_case_insensitive() {
        let mut monster = Monster {
            id: MonsterId::new(),
            name: "Skeleton".to_string(),
            kind: "undead".to_string(),
            ability_scores: AbilityScores::default(),
            armor_class: 13,
            hit_points: HitPoints::new(13),
            challenge_rating: 0.25,
            resistances: vec!["Piercing".to_string()],
            immunities: vec!["poison".to_string()],
            vulnerabilities: vec!["Bludgeoning".to_string()],
            actions: Vec::new(),
            experience_value: 50,
        };

        assert!(monster.is_resistant_to("piercing"));
        assert!(monster.is_immune_to("POISON"));
        assert!(monster.is_vulnerable_to("bludgeoning"));
        assert!(!monster.is_resistant_to("fire"));

        monster.hit_points.current = 0;
        assert!(monster.is_defeated());
    }

    #[test]
    fn test_character_alive_until_third_failure() {
        let mut character = Character::new("Tamsin");
        character.hit_points.current = 0;
        assert!(character.is_alive());
        assert!(!character.is_conscious());

        character.death_saves.add_failures(3);
        assert!(!character.is_alive());
    }

    #[test]
    fn test_push_entry_stamps_turn() {
        let mut state = GameState::new("Test", Character::new("Tamsin"));
        state.turn = 4;
        state.push_entry(StoryKind::Narration, "The gate creaks open.");
        assert_eq!(state.story_log.last().unwrap().turn, 4);
    }

    #[test]
    fn test_recent_entries_bounds() {
        let mut state = GameState::new("Test", Character::new("Tamsin"));
        for i in 0..7 {
            state.push_entry(StoryKind::Narration, format!("entry {i}"));
        }
        assert_eq!(state.recent_entries(3).len(), 3);
        assert_eq!(state.recent_entries(3)[0].content, "entry 4");
        assert_eq!(state.recent_entries(20).len(), 7);
    }
}
