//! Combat resolution.
//!
//! Deterministic rules for initiative, attacks, damage adjustment, healing,
//! death saves, and experience. All randomness comes from the caller's
//! [`DiceRoller`], so every outcome here is replayable under a seeded RNG.

use crate::dice::{Advantage, AttackRollResult, DiceError, DiceRoller};
use crate::world::{
    Character, DeathSaves, Difficulty, HitPoints, Monster, MonsterAction, MonsterId, MAX_LEVEL,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Experience required to reach each level, indexed by level - 1.
pub const XP_THRESHOLDS: [u32; 20] = [
    0, 300, 900, 2700, 6500, 14000, 23000, 34000, 48000, 64000, 85000, 100000, 120000, 140000,
    165000, 195000, 225000, 265000, 305000, 355000,
];

/// Level earned by a total experience amount. Scans the threshold table from
/// the top so the highest satisfied level wins.
pub fn level_for_xp(experience: u32) -> u8 {
    XP_THRESHOLDS
        .iter()
        .rposition(|&threshold| experience >= threshold)
        .map(|idx| (idx + 1) as u8)
        .unwrap_or(1)
}

/// Proficiency bonus for a monster by challenge rating.
pub fn proficiency_for_challenge(challenge_rating: f32) -> i32 {
    match challenge_rating as u32 {
        0..=4 => 2,
        5..=8 => 3,
        9..=12 => 4,
        13..=16 => 5,
        17..=20 => 6,
        21..=24 => 7,
        25..=28 => 8,
        _ => 9,
    }
}

/// Total experience awarded for a set of defeated monsters.
pub fn experience_reward(defeated: &[&Monster]) -> u32 {
    defeated.iter().map(|m| m.experience_value).sum()
}

// ============================================================================
// Leveling
// ============================================================================

/// Result of applying experience to a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpReport {
    pub experience_gained: u32,
    pub new_total: u32,
    pub previous_level: u8,
    pub new_level: u8,
    pub hit_points_gained: i32,
}

impl LevelUpReport {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

/// Hit points gained for one level: half the hit die rounded up, plus one,
/// plus the Constitution modifier, never below 1.
fn hit_points_per_level(hit_die_sides: u32, con_modifier: i32) -> i32 {
    let half_up = (hit_die_sides as i32 + 1) / 2;
    (half_up + 1 + con_modifier).max(1)
}

/// Add experience and apply any level gains. Each level gained raises the
/// hit point maximum and grants one hit die.
pub fn apply_experience(character: &mut Character, amount: u32) -> LevelUpReport {
    let previous_level = character.level;
    character.experience += amount;

    let new_level = level_for_xp(character.experience).min(MAX_LEVEL);
    let mut hit_points_gained = 0;

    if new_level > previous_level {
        let con_mod = character
            .ability_scores
            .modifier(crate::world::Ability::Constitution);
        let levels_gained = (new_level - previous_level) as i32;
        hit_points_gained = hit_points_per_level(character.hit_die_sides, con_mod) * levels_gained;

        character.level = new_level;
        character.hit_points.raise_maximum(hit_points_gained);
        character.hit_dice_remaining = character
            .hit_dice_remaining
            .saturating_add(levels_gained as u8);
    }

    LevelUpReport {
        experience_gained: amount,
        new_total: character.experience,
        previous_level,
        new_level: character.level,
        hit_points_gained,
    }
}

// ============================================================================
// Initiative
// ============================================================================

/// Who a turn slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatantRef {
    Player,
    Monster(MonsterId),
}

/// One entry in the initiative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub combatant: CombatantRef,
    pub name: String,
    pub initiative: i32,
    pub dexterity: u8,
}

/// Sort initiative entries: highest initiative first, ties broken by higher
/// dexterity score.
pub fn sort_initiative(entries: &mut [InitiativeEntry]) {
    entries.sort_by(|a, b| {
        b.initiative
            .cmp(&a.initiative)
            .then(b.dexterity.cmp(&a.dexterity))
    });
}

/// Roll initiative for the player and every monster, returning the sorted
/// turn order.
pub fn roll_initiative_order<R: Rng>(
    roller: &mut DiceRoller<R>,
    character: &Character,
    monsters: &[Monster],
) -> Vec<InitiativeEntry> {
    let mut entries = Vec::with_capacity(monsters.len() + 1);
    entries.push(InitiativeEntry {
        combatant: CombatantRef::Player,
        name: character.name.clone(),
        initiative: roller.roll_initiative(character.initiative_modifier()),
        dexterity: character.ability_scores.dexterity,
    });
    for monster in monsters {
        entries.push(InitiativeEntry {
            combatant: CombatantRef::Monster(monster.id),
            name: monster.name.clone(),
            initiative: roller.roll_initiative(monster.initiative_modifier()),
            dexterity: monster.ability_scores.dexterity,
        });
    }
    sort_initiative(&mut entries);
    entries
}

// ============================================================================
// Damage adjustment
// ============================================================================

/// How a target's damage-type tags altered a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageAdjustment {
    Unmodified,
    Immune,
    Resistant,
    Vulnerable,
}

/// Apply immunity, resistance, or vulnerability to rolled damage.
/// Immunity wins over the other tags; resistance halves rounding down;
/// vulnerability doubles.
pub fn adjust_damage(damage: u32, target: &Monster, damage_type: &str) -> (u32, DamageAdjustment) {
    if target.is_immune_to(damage_type) {
        (0, DamageAdjustment::Immune)
    } else if target.is_resistant_to(damage_type) {
        (damage / 2, DamageAdjustment::Resistant)
    } else if target.is_vulnerable_to(damage_type) {
        (damage * 2, DamageAdjustment::Vulnerable)
    } else {
        (damage, DamageAdjustment::Unmodified)
    }
}

// ============================================================================
// Attacks
// ============================================================================

/// Outcome of the player attacking a monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAttackOutcome {
    pub attack: AttackRollResult,
    pub damage_rolled: u32,
    pub damage_dealt: u32,
    pub adjustment: DamageAdjustment,
    pub target_remaining_hp: i32,
    pub killed: bool,
}

/// Resolve a player attack against a monster, mutating the target's hit
/// points on a hit. A miss leaves the target untouched.
pub fn resolve_player_attack<R: Rng>(
    roller: &mut DiceRoller<R>,
    attack_bonus: i32,
    damage_notation: &str,
    damage_type: &str,
    target: &mut Monster,
    advantage: Advantage,
) -> Result<PlayerAttackOutcome, DiceError> {
    let attack = roller.roll_attack(attack_bonus, target.armor_class, advantage);

    if !attack.hit {
        return Ok(PlayerAttackOutcome {
            attack,
            damage_rolled: 0,
            damage_dealt: 0,
            adjustment: DamageAdjustment::Unmodified,
            target_remaining_hp: target.hit_points.current,
            killed: false,
        });
    }

    let damage = roller.roll_damage(damage_notation, attack.critical_hit)?;
    let (dealt, adjustment) = adjust_damage(damage.total, target, damage_type);
    let was_alive = !target.is_defeated();
    target.hit_points.take_damage(dealt as i32);

    Ok(PlayerAttackOutcome {
        attack,
        damage_rolled: damage.total,
        damage_dealt: dealt,
        adjustment,
        target_remaining_hp: target.hit_points.current,
        killed: was_alive && target.is_defeated(),
    })
}

/// Outcome of a monster attacking the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterAttackOutcome {
    pub attack: AttackRollResult,
    pub damage_rolled: u32,
    pub damage_dealt: i32,
    pub absorbed_by_temporary: i32,
    pub target_remaining_hp: i32,
    pub dropped_to_zero: bool,
}

/// Resolve a monster's attack against the player. Rolled damage is scaled by
/// the difficulty multiplier (rounded down) before temporary hit points
/// absorb it.
pub fn resolve_monster_attack<R: Rng>(
    roller: &mut DiceRoller<R>,
    action: &MonsterAction,
    target: &mut Character,
    difficulty: Difficulty,
    advantage: Advantage,
) -> Result<MonsterAttackOutcome, DiceError> {
    let attack = roller.roll_attack(action.attack_bonus, target.armor_class, advantage);

    if !attack.hit {
        return Ok(MonsterAttackOutcome {
            attack,
            damage_rolled: 0,
            damage_dealt: 0,
            absorbed_by_temporary: 0,
            target_remaining_hp: target.hit_points.current,
            dropped_to_zero: false,
        });
    }

    let damage = roller.roll_damage(&action.damage_notation, attack.critical_hit)?;
    let scaled = (damage.total as f32 * difficulty.damage_multiplier()).floor() as i32;
    let result = target.hit_points.take_damage(scaled);

    Ok(MonsterAttackOutcome {
        attack,
        damage_rolled: damage.total,
        damage_dealt: scaled,
        absorbed_by_temporary: result.absorbed_by_temporary,
        target_remaining_hp: target.hit_points.current,
        dropped_to_zero: result.dropped_to_zero,
    })
}

// ============================================================================
// Healing
// ============================================================================

/// Outcome of rolled healing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealOutcome {
    pub rolled: u32,
    pub healed: i32,
    pub new_current: i32,
}

/// Roll healing and apply it, reporting the amount actually delivered after
/// clamping to the maximum.
pub fn resolve_healing<R: Rng>(
    roller: &mut DiceRoller<R>,
    notation: &str,
    hit_points: &mut HitPoints,
) -> Result<HealOutcome, DiceError> {
    let roll = roller.roll_notation(notation)?;
    let rolled = roll.total.max(0) as u32;
    let healed = hit_points.heal(rolled as i32);
    Ok(HealOutcome {
        rolled,
        healed,
        new_current: hit_points.current,
    })
}

// ============================================================================
// Death saves
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathSaveStatus {
    /// Still dying, keep rolling.
    InProgress,
    /// Natural 20: back on their feet with 1 hit point.
    Regained,
    /// Three successes: unconscious but stable.
    Stabilized,
    /// Three failures: dead. Terminal.
    Dead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathSaveOutcome {
    pub roll: u32,
    pub status: DeathSaveStatus,
    pub successes: u8,
    pub failures: u8,
}

/// Apply one death save roll to the counters. A natural 20 resets both
/// counters; a natural 1 counts as two failures; 10 or higher is a success;
/// anything else is a failure. Three successes stabilize and reset; three
/// failures are death.
pub fn apply_death_save(saves: &mut DeathSaves, roll: u32) -> DeathSaveOutcome {
    let status = if roll == 20 {
        saves.reset();
        DeathSaveStatus::Regained
    } else if roll == 1 {
        if saves.add_failures(2) {
            DeathSaveStatus::Dead
        } else {
            DeathSaveStatus::InProgress
        }
    } else if roll >= 10 {
        if saves.add_successes(1) {
            saves.reset();
            DeathSaveStatus::Stabilized
        } else {
            DeathSaveStatus::InProgress
        }
    } else if saves.add_failures(1) {
        DeathSaveStatus::Dead
    } else {
        DeathSaveStatus::InProgress
    };

    DeathSaveOutcome {
        roll,
        status,
        successes: saves.successes,
        failures: saves.failures,
    }
}

/// Roll a death save for an unconscious character. On a natural 20 the
/// character regains 1 hit point.
pub fn resolve_death_save<R: Rng>(
    roller: &mut DiceRoller<R>,
    character: &mut Character,
) -> DeathSaveOutcome {
    let roll = roller.roll_die(20);
    let outcome = apply_death_save(&mut character.death_saves, roll);
    if outcome.status == DeathSaveStatus::Regained {
        character.hit_points.heal(1);
    }
    outcome
}

// ============================================================================
// Combat session
// ============================================================================

/// An encounter in progress. Monsters live in an arena keyed by id; the turn
/// order holds references into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSession {
    pub id: Uuid,
    pub monsters: HashMap<MonsterId, Monster>,
    pub order: Vec<InitiativeEntry>,
    pub round: u32,
    /// The monsters struck first; grants them advantage in the opening round.
    #[serde(default)]
    pub ambush: bool,
}

impl CombatSession {
    /// Start an encounter: roll initiative for everyone and build the order.
    pub fn new<R: Rng>(
        roller: &mut DiceRoller<R>,
        character: &Character,
        monsters: Vec<Monster>,
    ) -> Self {
        let order = roll_initiative_order(roller, character, &monsters);
        let monsters = monsters.into_iter().map(|m| (m.id, m)).collect();
        Self {
            id: Uuid::new_v4(),
            monsters,
            order,
            round: 1,
            ambush: false,
        }
    }

    pub fn with_ambush(mut self, ambush: bool) -> Self {
        self.ambush = ambush;
        self
    }

    /// Advantage state for monster attacks this round. Ambushers keep the
    /// upper hand only through round one.
    pub fn monster_advantage(&self) -> Advantage {
        if self.ambush && self.round == 1 {
            Advantage::Advantage
        } else {
            Advantage::Normal
        }
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.get_mut(&id)
    }

    pub fn living_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values().filter(|m| !m.is_defeated())
    }

    pub fn defeated_monsters(&self) -> Vec<&Monster> {
        self.monsters.values().filter(|m| m.is_defeated()).collect()
    }

    pub fn is_over(&self) -> bool {
        self.living_monsters().next().is_none()
    }

    /// Experience owed for the monsters defeated so far.
    pub fn experience_reward(&self) -> u32 {
        experience_reward(&self.defeated_monsters())
    }
}

// ============================================================================
// Tests
// ============================================================================
