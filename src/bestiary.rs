//! Monster templates and instantiation.
//!
//! Combat triggers name their monsters in prose. Instantiation matches the
//! bestiary by exact name first (case-insensitive), then synthesizes a
//! stat block from keywords and an optional challenge rating hint.

use crate::world::{AbilityScores, HitPoints, Monster, MonsterAction, MonsterId};

/// A reusable stat block. Instantiating stamps a fresh id so the same
/// template can appear multiple times in one encounter.
#[derive(Debug, Clone)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub kind: &'static str,
    pub ability_scores: AbilityScores,
    pub armor_class: i32,
    pub hit_points: i32,
    pub challenge_rating: f32,
    pub resistances: &'static [&'static str],
    pub immunities: &'static [&'static str],
    pub vulnerabilities: &'static [&'static str],
    pub attack_name: &'static str,
    pub attack_bonus: i32,
    pub damage_notation: &'static str,
    pub damage_type: &'static str,
}

impl MonsterTemplate {
    pub fn instantiate(&self) -> Monster {
        Monster {
            id: MonsterId::new(),
            name: self.name.to_string(),
            kind: self.kind.to_string(),
            ability_scores: self.ability_scores,
            armor_class: self.armor_class,
            hit_points: HitPoints::new(self.hit_points),
            challenge_rating: self.challenge_rating,
            resistances: self.resistances.iter().map(|s| s.to_string()).collect(),
            immunities: self.immunities.iter().map(|s| s.to_string()).collect(),
            vulnerabilities: self.vulnerabilities.iter().map(|s| s.to_string()).collect(),
            actions: vec![MonsterAction {
                name: self.attack_name.to_string(),
                attack_bonus: self.attack_bonus,
                damage_notation: self.damage_notation.to_string(),
                damage_type: self.damage_type.to_string(),
                save_dc: None,
            }],
            experience_value: xp_for_challenge(self.challenge_rating),
        }
    }
}

/// Experience awarded for defeating a monster of a given challenge rating.
pub fn xp_for_challenge(challenge_rating: f32) -> u32 {
    match challenge_rating {
        cr if cr < 0.25 => 25,
        cr if cr < 0.5 => 50,
        cr if cr < 1.0 => 100,
        cr if cr < 2.0 => 200,
        cr if cr < 3.0 => 450,
        cr if cr < 4.0 => 700,
        cr if cr < 5.0 => 1100,
        cr if cr < 6.0 => 1800,
        cr if cr < 8.0 => 2300,
        cr if cr < 10.0 => 3900,
        _ => 5900,
    }
}

/// Look up a template by exact name, case-insensitively.
pub fn find_template(name: &str) -> Option<&'static MonsterTemplate> {
    let name_lower = name.to_lowercase();
    BESTIARY.iter().find(|t| t.name.to_lowercase() == name_lower)
}

/// Instantiate a monster for a free-form name. Falls back to a synthesized
/// stat block when the bestiary has no match. Always succeeds.
pub fn resolve_monster(name: &str, challenge_hint: Option<f32>) -> Monster {
    match find_template(name) {
        Some(template) => template.instantiate(),
        None => synthesize_monster(name, challenge_hint),
    }
}

/// Build a plausible monster from name keywords. The challenge hint, when
/// present, scales hit points, armor class, and attack numbers.
pub fn synthesize_monster(name: &str, challenge_hint: Option<f32>) -> Monster {
    let name_lower = name.to_lowercase();

    let kind = if ["skeleton", "zombie", "ghoul", "wight", "ghost"]
        .iter()
        .any(|w| name_lower.contains(w))
    {
        "undead"
    } else if ["wolf", "bear", "boar", "spider", "rat", "bat"]
        .iter()
        .any(|w| name_lower.contains(w))
    {
        "beast"
    } else if ["dragon", "drake", "wyvern"]
        .iter()
        .any(|w| name_lower.contains(w))
    {
        "dragon"
    } else if ["goblin", "orc", "bandit", "cultist", "kobold"]
        .iter()
        .any(|w| name_lower.contains(w))
    {
        "humanoid"
    } else if ["ogre", "troll", "giant"]
        .iter()
        .any(|w| name_lower.contains(w))
    {
        "giant"
    } else {
        "monstrosity"
    };

    let cr = challenge_hint.unwrap_or(match kind {
        "dragon" => 8.0,
        "giant" => 3.0,
        "undead" => 1.0,
        _ => 0.5,
    });

    // Roughly track bestiary numbers at the same challenge rating
    let cr_whole = cr.max(0.125);
    let hit_points = (7.0 + cr_whole * 15.0) as i32;
    let armor_class = 11 + (cr_whole as i32 / 3).min(7);
    let attack_bonus = 3 + (cr_whole as i32 / 2).min(8);
    let damage_notation = match cr_whole as u32 {
        0 => "1d6+1",
        1..=2 => "1d8+2",
        3..=5 => "2d8+3",
        6..=9 => "2d10+4",
        _ => "3d10+5",
    };

    let mut vulnerabilities = Vec::new();
    if kind == "undead" {
        vulnerabilities.push("radiant".to_string());
    }

    Monster {
        id: MonsterId::new(),
        name: name.to_string(),
        kind: kind.to_string(),
        ability_scores: AbilityScores::new(12, 12, 12, 8, 10, 8),
        armor_class,
        hit_points: HitPoints::new(hit_points),
        challenge_rating: cr,
        resistances: Vec::new(),
        immunities: Vec::new(),
        vulnerabilities,
        actions: vec![MonsterAction {
            name: "Strike".to_string(),
            attack_bonus,
            damage_notation: damage_notation.to_string(),
            damage_type: "bludgeoning".to_string(),
            save_dc: None,
        }],
        experience_value: xp_for_challenge(cr),
    }
}

// ============================================================================
// Bestiary
// ============================================================================

lazy_static::lazy_static! {
    /// Known stat blocks, matched by exact name.
    pub static ref BESTIARY: Vec<MonsterTemplate> = vec![
        MonsterTemplate {
            name: "Goblin",
            kind: "humanoid",
            ability_scores: AbilityScores::new(8, 14, 10, 10, 8, 8),
            armor_class: 15,
            hit_points: 7,
            challenge_rating: 0.25,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &[],
            attack_name: "Scimitar",
            attack_bonus: 4,
            damage_notation: "1d6+2",
            damage_type: "slashing",
        },
        MonsterTemplate {
            name: "Kobold",
            kind: "humanoid",
            ability_scores: AbilityScores::new(7, 15, 9, 8, 7, 8),
            armor_class: 12,
            hit_points: 5,
            challenge_rating: 0.125,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &[],
            attack_name: "Dagger",
            attack_bonus: 4,
            damage_notation: "1d4+2",
            damage_type: "piercing",
        },
        MonsterTemplate {
            name: "Bandit",
            kind: "humanoid",
            ability_scores: AbilityScores::new(11, 12, 12, 10, 10, 10),
            armor_class: 12,
            hit_points: 11,
            challenge_rating: 0.125,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &[],
            attack_name: "Scimitar",
            attack_bonus: 3,
            damage_notation: "1d6+1",
            damage_type: "slashing",
        },
        MonsterTemplate {
            name: "Skeleton",
            kind: "undead",
            ability_scores: AbilityScores::new(10, 14, 15, 6, 8, 5),
            armor_class: 13,
            hit_points: 13,
            challenge_rating: 0.25,
            resistances: &[],
            immunities: &["poison"],
            vulnerabilities: &["bludgeoning"],
            attack_name: "Shortsword",
            attack_bonus: 4,
            damage_notation: "1d6+2",
            damage_type: "piercing",
        },
        MonsterTemplate {
            name: "Zombie",
            kind: "undead",
            ability_scores: AbilityScores::new(13, 6, 16, 3, 6, 5),
            armor_class: 8,
            hit_points: 22,
            challenge_rating: 0.25,
            resistances: &[],
            immunities: &["poison"],
            vulnerabilities: &["radiant"],
            attack_name: "Slam",
            attack_bonus: 3,
            damage_notation: "1d6+1",
            damage_type: "bludgeoning",
        },
        MonsterTemplate {
            name: "Wolf",
            kind: "beast",
            ability_scores: AbilityScores::new(12, 15, 12, 3, 12, 6),
            armor_class: 13,
            hit_points: 11,
            challenge_rating: 0.25,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &[],
            attack_name: "Bite",
            attack_bonus: 4,
            damage_notation: "2d4+2",
            damage_type: "piercing",
        },
        MonsterTemplate {
            name: "Giant Spider",
            kind: "beast",
            ability_scores: AbilityScores::new(14, 16, 12, 2, 11, 4),
            armor_class: 14,
            hit_points: 26,
            challenge_rating: 1.0,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &[],
            attack_name: "Bite",
            attack_bonus: 5,
            damage_notation: "1d8+3",
            damage_type: "piercing",
        },
        MonsterTemplate {
            name: "Orc",
            kind: "humanoid",
            ability_scores: AbilityScores::new(16, 12, 16, 7, 11, 10),
            armor_class: 13,
            hit_points: 15,
            challenge_rating: 0.5,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &[],
            attack_name: "Greataxe",
            attack_bonus: 5,
            damage_notation: "1d12+3",
            damage_type: "slashing",
        },
        MonsterTemplate {
            name: "Ogre",
            kind: "giant",
            ability_scores: AbilityScores::new(19, 8, 16, 5, 7, 7),
            armor_class: 11,
            hit_points: 59,
            challenge_rating: 2.0,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &[],
            attack_name: "Greatclub",
            attack_bonus: 6,
            damage_notation: "2d8+4",
            damage_type: "bludgeoning",
        },
        MonsterTemplate {
            name: "Troll",
            kind: "giant",
            ability_scores: AbilityScores::new(18, 13, 20, 7, 9, 7),
            armor_class: 15,
            hit_points: 84,
            challenge_rating: 5.0,
            resistances: &[],
            immunities: &[],
            vulnerabilities: &["fire", "acid"],
            attack_name: "Claws",
            attack_bonus: 7,
            damage_notation: "2d6+4",
            damage_type: "slashing",
        },
        MonsterTemplate {
            name: "Wight",
            kind: "undead",
            ability_scores: AbilityScores::new(15, 14, 16, 10, 13, 15),
            armor_class: 14,
            hit_points: 45,
            challenge_rating: 3.0,
            resistances: &["necrotic"],
            immunities: &["poison"],
            vulnerabilities: &[],
            attack_name: "Longsword",
            attack_bonus: 4,
            damage_notation: "1d8+2",
            damage_type: "slashing",
        },
        MonsterTemplate {
            name: "Young Dragon",
            kind: "dragon",
            ability_scores: AbilityScores::new(19, 14, 17, 12, 11, 15),
            armor_class: 18,
            hit_points: 127,
            challenge_rating: 8.0,
            resistances: &[],
            immunities: &["fire"],
            vulnerabilities: &[],
            attack_name: "Bite",
            attack_bonus: 7,
            damage_notation: "2d10+4",
            damage_type: "piercing",
        },
    ];
}
