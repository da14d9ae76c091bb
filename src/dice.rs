//! Dice engine.
//!
//! Supports standard dice notation (`XdY+Z`), advantage/disadvantage,
//! skill checks, attack rolls, critical damage, and ability score generation.
//! All randomness flows through a [`DiceRoller`], which owns its RNG so tests
//! can seed it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for dice notation parsing.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
}

/// Advantage state for d20 rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Combine two advantage states (advantage + disadvantage = normal).
    pub fn combine(self, other: Advantage) -> Advantage {
        match (self, other) {
            (Advantage::Normal, x) | (x, Advantage::Normal) => x,
            (Advantage::Advantage, Advantage::Disadvantage) => Advantage::Normal,
            (Advantage::Disadvantage, Advantage::Advantage) => Advantage::Normal,
            (Advantage::Advantage, Advantage::Advantage) => Advantage::Advantage,
            (Advantage::Disadvantage, Advantage::Disadvantage) => Advantage::Disadvantage,
        }
    }

    /// Build from a pair of boolean flags. Both set cancel to normal.
    pub fn from_flags(advantage: bool, disadvantage: bool) -> Advantage {
        match (advantage, disadvantage) {
            (true, false) => Advantage::Advantage,
            (false, true) => Advantage::Disadvantage,
            _ => Advantage::Normal,
        }
    }
}

/// A parsed `NdM±K` notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceNotation {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
    pub original: String,
}

impl DiceNotation {
    /// Parse a notation string like `2d6+3`, `d20`, or `1d8-1`.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let trimmed = notation.trim().to_lowercase();
        if trimmed.is_empty() {
            return Err(DiceError::NoDice);
        }

        let d_pos = trimmed
            .find('d')
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;

        let count_str = &trimmed[..d_pos];
        let rest = &trimmed[d_pos + 1..];

        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?
        };

        let (sides_str, modifier) = if let Some(pos) = rest.find(['+', '-']) {
            let sign: i32 = if rest.as_bytes()[pos] == b'+' { 1 } else { -1 };
            let value: i32 = rest[pos + 1..]
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
            (&rest[..pos], sign * value)
        } else {
            (rest, 0)
        };

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;
        if sides == 0 {
            return Err(DiceError::InvalidDieSize(0));
        }
        if count == 0 {
            return Err(DiceError::NoDice);
        }

        Ok(DiceNotation {
            count,
            sides,
            modifier,
            original: trimmed,
        })
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier.cmp(&0) {
            std::cmp::Ordering::Greater => write!(f, "+{}", self.modifier),
            std::cmp::Ordering::Less => write!(f, "{}", self.modifier),
            std::cmp::Ordering::Equal => Ok(()),
        }
    }
}

/// Result of rolling a group of identical dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub rolls: Vec<u32>,
    pub sides: u32,
    pub total: u32,
}

/// Result of rolling a full notation (dice plus flat modifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotationRoll {
    pub notation: DiceNotation,
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
}

impl fmt::Display for NotationRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice: Vec<String> = self.rolls.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]", dice.join(", "))?;
        if self.modifier > 0 {
            write!(f, " + {}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, " - {}", self.modifier.abs())?;
        }
        write!(f, " = {}", self.total)
    }
}

/// A d20 roll, possibly rolled twice for advantage or disadvantage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct D20Check {
    pub first: u32,
    pub second: Option<u32>,
    pub kept: u32,
    pub advantage: Advantage,
}

impl D20Check {
    pub fn natural_20(&self) -> bool {
        self.kept == 20
    }

    pub fn natural_1(&self) -> bool {
        self.kept == 1
    }
}

/// Result of an ability or skill check against a DC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCheckResult {
    pub check: D20Check,
    pub modifier: i32,
    pub total: i32,
    pub dc: i32,
    pub success: bool,
    pub critical_success: bool,
    pub critical_failure: bool,
}

impl SkillCheckResult {
    /// Judge a check given an already-rolled d20. Critical flags come from
    /// the kept die face, independent of whether the total beats the DC.
    pub fn from_check(check: D20Check, modifier: i32, dc: i32) -> SkillCheckResult {
        let total = check.kept as i32 + modifier;
        SkillCheckResult {
            critical_success: check.natural_20(),
            critical_failure: check.natural_1(),
            success: total >= dc,
            check,
            modifier,
            total,
            dc,
        }
    }
}

impl fmt::Display for SkillCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.success { "success" } else { "failure" };
        write!(
            f,
            "d20({}) {:+} = {} vs DC {}: {}",
            self.check.kept, self.modifier, self.total, self.dc, outcome
        )
    }
}

/// Result of an attack roll against an armor class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRollResult {
    pub check: D20Check,
    pub attack_bonus: i32,
    pub total: i32,
    pub target_ac: i32,
    pub hit: bool,
    pub critical_hit: bool,
    pub critical_miss: bool,
}

impl AttackRollResult {
    /// Judge an attack given an already-rolled d20. A natural 20 always hits
    /// and crits regardless of AC; a natural 1 always misses regardless of
    /// bonus.
    pub fn from_check(check: D20Check, attack_bonus: i32, target_ac: i32) -> AttackRollResult {
        let total = check.kept as i32 + attack_bonus;
        let (hit, critical_hit, critical_miss) = if check.natural_20() {
            (true, true, false)
        } else if check.natural_1() {
            (false, false, true)
        } else {
            (total >= target_ac, false, false)
        };
        AttackRollResult {
            check,
            attack_bonus,
            total,
            target_ac,
            hit,
            critical_hit,
            critical_miss,
        }
    }
}

impl fmt::Display for AttackRollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match (self.critical_hit, self.critical_miss, self.hit) {
            (true, _, _) => "critical hit",
            (_, true, _) => "critical miss",
            (_, _, true) => "hit",
            _ => "miss",
        };
        write!(
            f,
            "d20({}) {:+} = {} vs AC {}: {}",
            self.check.kept, self.attack_bonus, self.total, self.target_ac, outcome
        )
    }
}

/// Result of a damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRollResult {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: u32,
    pub critical: bool,
}

/// Result of rolling 4d6 and keeping the highest three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScoreRoll {
    pub rolls: [u32; 4],
    pub kept: [u32; 3],
    pub dropped: u32,
    pub total: u32,
}

/// Dice roller owning its random number generator.
#[derive(Debug)]
pub struct DiceRoller<R: Rng = StdRng> {
    rng: R,
}

impl DiceRoller<StdRng> {
    /// Roller seeded from the operating system.
    pub fn from_entropy() -> Self {
        DiceRoller {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic roller for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        DiceRoller {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> DiceRoller<R> {
    pub fn with_rng(rng: R) -> Self {
        DiceRoller { rng }
    }

    /// Roll a single die, uniform in `1..=sides`. Zero sides rolls a 1.
    pub fn roll_die(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        self.rng.gen_range(1..=sides)
    }

    /// Roll `count` dice of the same size.
    pub fn roll_dice(&mut self, count: u32, sides: u32) -> DiceRoll {
        let rolls: Vec<u32> = (0..count).map(|_| self.roll_die(sides)).collect();
        let total = rolls.iter().sum();
        DiceRoll {
            rolls,
            sides,
            total,
        }
    }

    /// Parse and roll a notation string like `2d6+3`.
    pub fn roll_notation(&mut self, notation: &str) -> Result<NotationRoll, DiceError> {
        let parsed = DiceNotation::parse(notation)?;
        let dice = self.roll_dice(parsed.count, parsed.sides);
        let total = dice.total as i32 + parsed.modifier;
        Ok(NotationRoll {
            modifier: parsed.modifier,
            notation: parsed,
            rolls: dice.rolls,
            total,
        })
    }

    /// Roll a d20, twice when advantage or disadvantage applies.
    pub fn roll_d20_check(&mut self, advantage: Advantage) -> D20Check {
        let first = self.roll_die(20);
        match advantage {
            Advantage::Normal => D20Check {
                first,
                second: None,
                kept: first,
                advantage,
            },
            Advantage::Advantage => {
                let second = self.roll_die(20);
                D20Check {
                    first,
                    second: Some(second),
                    kept: first.max(second),
                    advantage,
                }
            }
            Advantage::Disadvantage => {
                let second = self.roll_die(20);
                D20Check {
                    first,
                    second: Some(second),
                    kept: first.min(second),
                    advantage,
                }
            }
        }
    }

    /// Roll a skill check against a DC.
    pub fn roll_skill_check(
        &mut self,
        modifier: i32,
        dc: i32,
        advantage: Advantage,
    ) -> SkillCheckResult {
        let check = self.roll_d20_check(advantage);
        SkillCheckResult::from_check(check, modifier, dc)
    }

    /// Roll an attack against an armor class.
    pub fn roll_attack(
        &mut self,
        attack_bonus: i32,
        target_ac: i32,
        advantage: Advantage,
    ) -> AttackRollResult {
        let check = self.roll_d20_check(advantage);
        AttackRollResult::from_check(check, attack_bonus, target_ac)
    }

    /// Roll damage from a notation. A critical hit doubles the number of
    /// dice rolled, never the flat modifier.
    pub fn roll_damage(
        &mut self,
        notation: &str,
        critical: bool,
    ) -> Result<DamageRollResult, DiceError> {
        let parsed = DiceNotation::parse(notation)?;
        let count = if critical { parsed.count * 2 } else { parsed.count };
        let dice = self.roll_dice(count, parsed.sides);
        let total = (dice.total as i32 + parsed.modifier).max(0) as u32;
        Ok(DamageRollResult {
            rolls: dice.rolls,
            modifier: parsed.modifier,
            total,
            critical,
        })
    }

    /// Roll 4d6 and keep the highest three, recording the dropped die.
    pub fn roll_ability_score(&mut self) -> AbilityScoreRoll {
        let rolls = [
            self.roll_die(6),
            self.roll_die(6),
            self.roll_die(6),
            self.roll_die(6),
        ];
        let mut sorted = rolls;
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        let kept = [sorted[0], sorted[1], sorted[2]];
        AbilityScoreRoll {
            rolls,
            kept,
            dropped: sorted[3],
            total: kept.iter().sum(),
        }
    }

    /// Roll initiative: d20 plus a modifier.
    pub fn roll_initiative(&mut self, modifier: i32) -> i32 {
        self.roll_die(20) as i32 + modifier
    }
}
