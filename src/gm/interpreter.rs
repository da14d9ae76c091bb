//! Turn interpretation.
//!
//! [`interpret`] is the bridge between a structured narrative response and
//! the mechanical state. It is a pure function of its inputs: the same
//! state, response, and roller seed always produce the same outcome, and
//! no state leaks between calls.

use crate::actions::{execute_all, GameAction};
use crate::bestiary;
use crate::combat::CombatSession;
use crate::dice::{DiceRoller, SkillCheckResult};
use crate::gm::provider::{NarrativeResponse, ProposedReward};
use crate::world::{GameState, Scene, Skill, StoryEntry, StoryKind};
use rand::Rng;

/// A resolved skill check, with the skill it was rolled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCheckOutcome {
    pub skill: Skill,
    pub result: SkillCheckResult,
}

impl SkillCheckOutcome {
    fn describe(&self, character_name: &str) -> String {
        let verdict = if self.result.critical_success {
            "critical success"
        } else if self.result.critical_failure {
            "critical failure"
        } else if self.result.success {
            "success"
        } else {
            "failure"
        };
        format!(
            "{} rolls {} ({} vs DC {}): {}",
            character_name,
            self.skill.name(),
            self.result.total,
            self.result.dc,
            verdict
        )
    }
}

/// Everything one interpreted turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The state after all accepted mechanics were applied.
    pub state: GameState,
    /// Story entries appended this turn, in order.
    pub log_delta: Vec<StoryEntry>,
    /// A freshly started encounter, when the narrative triggered one.
    pub combat: Option<CombatSession>,
    /// The resolved skill check, when one was proposed.
    pub check: Option<SkillCheckOutcome>,
    pub suggestions: Vec<String>,
    pub choices: Vec<String>,
    /// Reasons for rewards or actions the pipeline refused.
    pub rejected: Vec<String>,
}

/// Apply a narrative response to the game state.
///
/// Steps run in a fixed order: skill check, rewards through the action
/// pipeline, combat instantiation, scene change, then log entries. The
/// player's own entry is appended only when `player_entry_logged` is false,
/// so callers that log eagerly don't double up. The turn counter belongs to
/// the caller; every entry is stamped with the state's current turn.
pub fn interpret<R: Rng>(
    state: &GameState,
    response: &NarrativeResponse,
    player_action: &str,
    player_entry_logged: bool,
    roller: &mut DiceRoller<R>,
) -> TurnOutcome {
    let mut state = state.clone();
    let log_start = state.story_log.len();
    let mut rejected = Vec::new();

    // 1. Resolve the proposed skill check with the character's modifier and
    // whatever advantage the circumstances grant. An unknown skill name is a
    // rejection, not a crash.
    let check = response.skill_check.as_ref().and_then(|proposed| {
        match Skill::from_name(&proposed.skill) {
            Some(skill) => {
                let modifier = state.character.skill_modifier(skill);
                let result = roller.roll_skill_check(modifier, proposed.dc, proposed.advantage);
                Some(SkillCheckOutcome { skill, result })
            }
            None => {
                rejected.push(format!("unknown skill: {}", proposed.skill));
                None
            }
        }
    });

    // 2. Rewards go through the same pipeline as everything else. Whatever
    // the validator refuses is absorbed as a message, never an error.
    // Reputation has no mechanical counterpart, so it lands straight in the
    // log rather than through an action.
    let mut reward_messages = Vec::new();
    if !response.rewards.is_empty() {
        let mut actions = Vec::new();
        let mut standing_notes = Vec::new();
        for reward in &response.rewards {
            match reward {
                ProposedReward::Item { name, quantity } => actions.push(GameAction::AddItem {
                    name: name.clone(),
                    quantity: *quantity,
                }),
                ProposedReward::Gold { amount } => {
                    actions.push(GameAction::AddGold { amount: *amount })
                }
                ProposedReward::Experience { amount } => {
                    actions.push(GameAction::AddXp { amount: *amount })
                }
                ProposedReward::Reputation { faction, amount } => {
                    let verb = if *amount >= 0 { "improves" } else { "suffers" };
                    standing_notes.push(format!("Your standing with {faction} {verb}."));
                }
            }
        }
        if !actions.is_empty() {
            let report = execute_all(state, actions, roller);
            state = report.state;
            reward_messages = report.messages;
            rejected.extend(report.rejections);
        }
        reward_messages.extend(standing_notes);
    }

    // 3. Combat trigger: instantiate monsters and roll initiative.
    let combat = response
        .combat
        .as_ref()
        .filter(|trigger| !trigger.monsters.is_empty())
        .map(|trigger| {
            let mut monsters = Vec::new();
            for spawn in &trigger.monsters {
                for _ in 0..spawn.count.max(1) {
                    monsters.push(bestiary::resolve_monster(
                        &spawn.name,
                        spawn.challenge_rating,
                    ));
                }
            }
            CombatSession::new(roller, &state.character, monsters).with_ambush(trigger.ambush)
        });

    // 4. Scene change, then re-assert combat state so a move into an ambush
    // doesn't clear the flag the trigger just implied.
    if let Some(change) = &response.scene_change {
        state.scene = Scene::new(&change.name, &change.description);
    }
    if combat.is_some() {
        state.scene.in_combat = true;
    }

    // 5. Ordered log entries.
    if !player_entry_logged && !player_action.trim().is_empty() {
        state.push_entry(StoryKind::PlayerAction, player_action.trim());
    }
    if !response.narration.is_empty() {
        state.push_entry(StoryKind::Narration, response.narration.clone());
    }
    for line in &response.dialogue {
        state.push_entry(StoryKind::Dialogue, format!("{}: {}", line.speaker, line.line));
    }
    if let Some(outcome) = &check {
        let line = outcome.describe(&state.character.name);
        state.push_entry(StoryKind::CheckOutcome, line);
    }
    for message in reward_messages {
        state.push_entry(StoryKind::System, message);
    }
    if let Some(session) = &combat {
        let roster = session
            .order
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let line = if session.ambush {
            format!("Ambush! Combat begins: {roster}")
        } else {
            format!("Combat begins: {roster}")
        };
        state.push_entry(StoryKind::Combat, line);
    }

    let log_delta = state.story_log[log_start..].to_vec();
    state.touch();

    TurnOutcome {
        state,
        log_delta,
        combat,
        check,
        suggestions: response.suggested_actions.clone(),
        choices: response.choices.clone(),
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Advantage;
    use crate::gm::provider::{
        CombatTrigger, MonsterSpawn, ProposedCheck, SceneChange,
    };
    use crate::world::create_sample_fighter;

    fn fresh_state() -> GameState {
        GameState::new("Test Adventure", create_sample_fighter("Tamsin"))
    }

    #[test]
    fn test_interpret_is_pure_under_same_seed() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "A chest sits in the corner.".to_string(),
            skill_check: Some(ProposedCheck {
                skill: "Perception".to_string(),
                dc: 12,
                advantage: Advantage::Normal,
            }),
            rewards: vec![ProposedReward::Gold { amount: 15 }],
            ..Default::default()
        };

        let a = interpret(
            &state,
            &response,
            "search the room",
            false,
            &mut DiceRoller::seeded(40),
        );
        let b = interpret(
            &state,
            &response,
            "search the room",
            false,
            &mut DiceRoller::seeded(40),
        );
        assert_eq!(a.state.gold, b.state.gold);
        assert_eq!(a.state.story_log, b.state.story_log);
        assert_eq!(a.check, b.check);
        assert_eq!(a.log_delta, b.log_delta);
    }

    #[test]
    fn test_input_state_never_mutated() {
        let state = fresh_state();
        let before = state.clone();
        let response = NarrativeResponse {
            narration: "Rain begins to fall.".to_string(),
            rewards: vec![ProposedReward::Gold { amount: 5 }],
            ..Default::default()
        };
        let _ = interpret(&state, &response, "walk on", false, &mut DiceRoller::seeded(41));
        assert_eq!(state, before);
    }

    #[test]
    fn test_skill_check_resolved_with_character_modifier() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "The wall looks climbable.".to_string(),
            skill_check: Some(ProposedCheck {
                skill: "athletics".to_string(),
                dc: 10,
                advantage: Advantage::Normal,
            }),
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "climb", false, &mut DiceRoller::seeded(42));
        let check = outcome.check.unwrap();
        assert_eq!(check.skill, Skill::Athletics);
        assert_eq!(
            check.result.total,
            check.result.check.kept as i32 + state.character.skill_modifier(Skill::Athletics)
        );
    }

    #[test]
    fn test_check_advantage_reaches_the_dice() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "The guard is distracted.".to_string(),
            skill_check: Some(ProposedCheck {
                skill: "Stealth".to_string(),
                dc: 12,
                advantage: Advantage::Advantage,
            }),
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "sneak past", false, &mut DiceRoller::seeded(51));
        let check = outcome.check.unwrap();
        assert_eq!(check.result.check.advantage, Advantage::Advantage);
        let second = check.result.check.second.unwrap();
        assert_eq!(
            check.result.check.kept,
            check.result.check.first.max(second)
        );
    }

    #[test]
    fn test_reputation_reward_lands_in_the_log() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "The elder nods slowly.".to_string(),
            rewards: vec![
                ProposedReward::Gold { amount: 5 },
                ProposedReward::Reputation {
                    faction: "the Riverfolk".to_string(),
                    amount: 1,
                },
            ],
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "return the ledger", false, &mut DiceRoller::seeded(52));
        assert_eq!(outcome.state.gold, state.gold + 5);
        assert!(outcome
            .log_delta
            .iter()
            .any(|e| e.kind == StoryKind::System
                && e.content.contains("standing with the Riverfolk improves")));
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_ambush_carries_into_the_encounter() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "Arrows hiss from the treeline!".to_string(),
            combat: Some(CombatTrigger {
                monsters: vec![MonsterSpawn {
                    name: "Bandit".to_string(),
                    count: 2,
                    challenge_rating: None,
                }],
                ambush: true,
            }),
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "follow the track", false, &mut DiceRoller::seeded(53));
        let session = outcome.combat.unwrap();
        assert!(session.ambush);
        assert_eq!(session.monster_advantage(), Advantage::Advantage);
        assert!(outcome
            .log_delta
            .iter()
            .any(|e| e.kind == StoryKind::Combat && e.content.contains("Ambush")));
    }

    #[test]
    fn test_unknown_skill_is_rejected_not_fatal() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "Hmm.".to_string(),
            skill_check: Some(ProposedCheck {
                skill: "Underwater Basket Weaving".to_string(),
                dc: 10,
                advantage: Advantage::Normal,
            }),
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "try it", false, &mut DiceRoller::seeded(43));
        assert!(outcome.check.is_none());
        assert!(outcome.rejected[0].contains("unknown skill"));
    }

    #[test]
    fn test_rewards_flow_through_pipeline() {
        let state = fresh_state();
        let gold_before = state.gold;
        let response = NarrativeResponse {
            narration: "You pry the lockbox open.".to_string(),
            rewards: vec![
                ProposedReward::Gold { amount: 30 },
                ProposedReward::Item {
                    name: "Healing Potion".to_string(),
                    quantity: 1,
                },
            ],
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "open lockbox", false, &mut DiceRoller::seeded(44));
        assert_eq!(outcome.state.gold, gold_before + 30);
        assert!(outcome.state.inventory.has_item("Healing Potion"));
    }

    #[test]
    fn test_combat_trigger_builds_session_and_flags_scene() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "Goblins burst from the brush!".to_string(),
            combat: Some(CombatTrigger {
                monsters: vec![MonsterSpawn {
                    name: "Goblin".to_string(),
                    count: 2,
                    challenge_rating: None,
                }],
                ambush: false,
            }),
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "walk the trail", false, &mut DiceRoller::seeded(45));
        let session = outcome.combat.unwrap();
        assert_eq!(session.monsters.len(), 2);
        assert_eq!(session.order.len(), 3);
        assert!(outcome.state.scene.in_combat);
        assert!(outcome
            .log_delta
            .iter()
            .any(|e| e.kind == StoryKind::Combat));
    }

    #[test]
    fn test_empty_combat_trigger_ignored() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "All quiet.".to_string(),
            combat: Some(CombatTrigger {
                monsters: vec![],
                ambush: false,
            }),
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "look", false, &mut DiceRoller::seeded(46));
        assert!(outcome.combat.is_none());
        assert!(!outcome.state.scene.in_combat);
    }

    #[test]
    fn test_scene_change_applied() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "The gate grinds open.".to_string(),
            scene_change: Some(SceneChange {
                name: "Hollowmere Keep".to_string(),
                description: "Moss swallows the old stones.".to_string(),
            }),
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "enter", false, &mut DiceRoller::seeded(47));
        assert_eq!(outcome.state.scene.name, "Hollowmere Keep");
    }

    #[test]
    fn test_player_entry_skipped_when_already_logged() {
        let mut state = fresh_state();
        state.push_entry(StoryKind::PlayerAction, "open the door");
        let response = NarrativeResponse::narration_only("It swings wide.");

        let outcome = interpret(&state, &response, "open the door", true, &mut DiceRoller::seeded(48));
        let player_entries = outcome
            .state
            .story_log
            .iter()
            .filter(|e| e.kind == StoryKind::PlayerAction)
            .count();
        assert_eq!(player_entries, 1);
    }

    #[test]
    fn test_log_entries_ordered() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "A stranger waves you over.".to_string(),
            dialogue: vec![crate::gm::provider::DialogueLine {
                speaker: "Stranger".to_string(),
                line: "You look lost.".to_string(),
            }],
            rewards: vec![ProposedReward::Gold { amount: 1 }],
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "approach", false, &mut DiceRoller::seeded(49));

        let kinds: Vec<StoryKind> = outcome.log_delta.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StoryKind::PlayerAction,
                StoryKind::Narration,
                StoryKind::Dialogue,
                StoryKind::System,
            ]
        );
    }

    #[test]
    fn test_suggestions_and_choices_surfaced() {
        let state = fresh_state();
        let response = NarrativeResponse {
            narration: "The road forks.".to_string(),
            suggested_actions: vec!["Take the left path".to_string()],
            choices: vec!["Left".to_string(), "Right".to_string()],
            ..Default::default()
        };
        let outcome = interpret(&state, &response, "walk", false, &mut DiceRoller::seeded(50));
        assert_eq!(outcome.suggestions.len(), 1);
        assert_eq!(outcome.choices.len(), 2);
    }
}
