//! Mechanical action pipeline.
//!
//! Narrative output is translated into a batch of [`GameAction`]s, validated,
//! and applied to an owned copy of the game state. Invalid actions never
//! abort the batch; each one becomes a human-readable message and execution
//! moves on.

use crate::combat::apply_experience;
use crate::dice::{DiceNotation, DiceRoller};
use crate::items;
use crate::world::{GameState, ItemEffect, Scene, StoryKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kinds of rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestKind {
    Short,
    Long,
}

/// Every mechanical effect the narrative layer may request. Closed on
/// purpose: the executor matches exhaustively, so a new action variant is a
/// compile error everywhere it matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameAction {
    AddItem { name: String, quantity: u32 },
    RemoveItem { name: String, quantity: u32 },
    UseItem { name: String },
    Heal { notation: String },
    Damage { amount: u32, damage_type: String },
    AddGold { amount: u32 },
    SpendGold { amount: u32 },
    AddXp { amount: u32 },
    ChangeLocation { name: String, description: String },
    Rest { kind: RestKind },
}

/// Most gold a single reward may grant at a character level.
pub fn max_gold_reward(level: u8) -> u32 {
    match level {
        0..=4 => 100,
        5..=8 => 500,
        9..=12 => 2000,
        13..=16 => 10000,
        _ => 50000,
    }
}

/// Most experience a single reward may grant at a character level.
pub fn max_xp_reward(level: u8) -> u32 {
    match level {
        0..=4 => 500,
        5..=8 => 2500,
        9..=12 => 10000,
        13..=16 => 30000,
        _ => 100000,
    }
}

/// Check an action against the current state. Returns a human-readable
/// rejection reason; rejections are expected input, not errors.
pub fn validate(state: &GameState, action: &GameAction) -> Result<(), String> {
    match action {
        GameAction::AddItem { name, quantity } => {
            if name.trim().is_empty() {
                return Err("item name must not be empty".to_string());
            }
            if *quantity == 0 {
                return Err(format!("quantity for {name} must be positive"));
            }
            Ok(())
        }
        GameAction::RemoveItem { name, quantity } => {
            if *quantity == 0 {
                return Err(format!("quantity for {name} must be positive"));
            }
            match state.inventory.find_item(name) {
                None => Err(format!("{} doesn't have a {name}", state.character.name)),
                Some(item) if item.quantity < *quantity => Err(format!(
                    "{} doesn't have enough {name} (has {}, needs {quantity})",
                    state.character.name, item.quantity
                )),
                Some(_) => Ok(()),
            }
        }
        GameAction::UseItem { name } => {
            if state.inventory.has_item(name) {
                Ok(())
            } else {
                Err(format!("{} doesn't have a {name}", state.character.name))
            }
        }
        GameAction::Heal { notation } => DiceNotation::parse(notation)
            .map(|_| ())
            .map_err(|e| format!("invalid healing notation {notation}: {e}")),
        GameAction::Damage { amount, .. } => {
            if *amount == 0 {
                Err("damage amount must be positive".to_string())
            } else {
                Ok(())
            }
        }
        GameAction::AddGold { amount } | GameAction::AddXp { amount } => {
            if *amount == 0 {
                Err("amount must be positive".to_string())
            } else {
                Ok(())
            }
        }
        GameAction::SpendGold { amount } => {
            if *amount == 0 {
                Err("amount must be positive".to_string())
            } else if state.gold < *amount {
                Err(format!(
                    "not enough gold (has {}, needs {amount})",
                    state.gold
                ))
            } else {
                Ok(())
            }
        }
        GameAction::ChangeLocation { name, .. } => {
            if name.trim().is_empty() {
                Err("location name must not be empty".to_string())
            } else {
                Ok(())
            }
        }
        GameAction::Rest { .. } => Ok(()),
    }
}

/// Result of running a batch of actions.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// The state after all accepted actions were applied.
    pub state: GameState,
    /// Actions that passed validation and took effect.
    pub applied: Vec<GameAction>,
    /// One line per notable outcome, including every rejection.
    pub messages: Vec<String>,
    /// The rejection reasons alone, in batch order.
    pub rejections: Vec<String>,
}

/// Validate and apply a batch of actions against an owned state copy.
/// Rejected actions are reported and skipped; the rest of the batch still
/// runs.
pub fn execute_all<R: Rng>(
    mut state: GameState,
    actions: Vec<GameAction>,
    roller: &mut DiceRoller<R>,
) -> ExecutionReport {
    let mut applied = Vec::new();
    let mut messages = Vec::new();
    let mut rejections = Vec::new();

    for action in actions {
        if let Err(reason) = validate(&state, &action) {
            tracing::debug!(?action, %reason, "action rejected");
            messages.push(reason.clone());
            rejections.push(reason);
            continue;
        }
        match apply(&mut state, &action, roller) {
            Ok(message) => {
                messages.push(message);
                applied.push(action);
            }
            Err(reason) => {
                tracing::debug!(?action, %reason, "action failed");
                messages.push(reason.clone());
                rejections.push(reason);
            }
        }
    }

    // Mutation paths clamp individually; this catches anything they missed.
    state.character.hit_points.clamp();
    state.touch();

    ExecutionReport {
        state,
        applied,
        messages,
        rejections,
    }
}

fn apply<R: Rng>(
    state: &mut GameState,
    action: &GameAction,
    roller: &mut DiceRoller<R>,
) -> Result<String, String> {
    match action {
        GameAction::AddItem { name, quantity } => {
            let item = items::resolve_item(name, *quantity);
            let display_name = item.name.clone();
            let added = state.inventory.add_item(item);
            if added == 0 {
                Err(format!("no room in the pack for {display_name}"))
            } else {
                Ok(format!("Gained {added}x {display_name}"))
            }
        }
        GameAction::RemoveItem { name, quantity } => {
            // Presence and quantity were checked in validate
            state.inventory.remove_item(name, *quantity);
            Ok(format!("Lost {quantity}x {name}"))
        }
        GameAction::UseItem { name } => {
            let item = state
                .inventory
                .find_item(name)
                .cloned()
                .ok_or_else(|| format!("{name} vanished before it could be used"))?;

            let mut message = format!("Used {}", item.name);
            match &item.effect {
                ItemEffect::Healing { notation } => {
                    let roll = roller
                        .roll_notation(notation)
                        .map_err(|e| format!("{} has a bad effect: {e}", item.name))?;
                    let healed = state.character.hit_points.heal(roll.total.max(0));
                    message = format!("Used {}, recovered {healed} HP", item.name);
                }
                ItemEffect::TemporaryHitPoints { amount } => {
                    state.character.hit_points.add_temporary(*amount);
                    message = format!("Used {}, gained {amount} temporary HP", item.name);
                }
                ItemEffect::None => {}
            }
            if item.is_consumable() {
                state.inventory.remove_item(&item.name, 1);
            }
            Ok(message)
        }
        GameAction::Heal { notation } => {
            let roll = roller
                .roll_notation(notation)
                .map_err(|e| format!("invalid healing notation {notation}: {e}"))?;
            let healed = state.character.hit_points.heal(roll.total.max(0));
            Ok(format!("Recovered {healed} HP"))
        }
        GameAction::Damage {
            amount,
            damage_type,
        } => {
            let result = state.character.hit_points.take_damage(*amount as i32);
            let mut message = format!(
                "Took {} {damage_type} damage",
                result.absorbed_by_temporary + result.hit_points_lost
            );
            if result.dropped_to_zero {
                message.push_str(&format!(
                    " and fell unconscious, {}",
                    state.character.name
                ));
            }
            Ok(message)
        }
        GameAction::AddGold { amount } => {
            let clamped = (*amount).min(max_gold_reward(state.character.level));
            state.gold = state.gold.saturating_add(clamped);
            if clamped < *amount {
                Ok(format!("Gained {clamped} gold (reward capped)"))
            } else {
                Ok(format!("Gained {clamped} gold"))
            }
        }
        GameAction::SpendGold { amount } => {
            state.gold -= amount;
            Ok(format!("Spent {amount} gold, {} remaining", state.gold))
        }
        GameAction::AddXp { amount } => {
            let clamped = (*amount).min(max_xp_reward(state.character.level));
            let report = apply_experience(&mut state.character, clamped);
            if report.leveled_up() {
                Ok(format!(
                    "Gained {clamped} XP and reached level {} (+{} max HP)",
                    report.new_level, report.hit_points_gained
                ))
            } else {
                Ok(format!("Gained {clamped} XP"))
            }
        }
        GameAction::ChangeLocation { name, description } => {
            state.scene = Scene::new(name, description);
            Ok(format!("Moved to {name}"))
        }
        GameAction::Rest { kind } => match kind {
            RestKind::Long => {
                let hp = &mut state.character.hit_points;
                hp.current = hp.maximum;
                hp.temporary = 0;
                state.character.hit_dice_remaining = state.character.level;
                state.character.death_saves.reset();
                Ok("Took a long rest, fully recovered".to_string())
            }
            RestKind::Short => {
                if state.character.hit_dice_remaining == 0 {
                    return Ok("Took a short rest, no hit dice left to spend".to_string());
                }
                state.character.hit_dice_remaining -= 1;
                let die = roller.roll_die(state.character.hit_die_sides);
                let con = state
                    .character
                    .ability_scores
                    .modifier(crate::world::Ability::Constitution);
                let healed = state.character.hit_points.heal((die as i32 + con).max(1));
                Ok(format!("Took a short rest, recovered {healed} HP"))
            }
        },
    }
}

/// Convenience wrapper: run a batch and log the outcomes into the story.
pub fn execute_and_log<R: Rng>(
    state: GameState,
    actions: Vec<GameAction>,
    roller: &mut DiceRoller<R>,
) -> ExecutionReport {
    let mut report = execute_all(state, actions, roller);
    for message in &report.messages {
        report.state.push_entry(StoryKind::System, message.clone());
    }
    report
}
