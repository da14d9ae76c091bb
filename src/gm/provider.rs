//! Narrative provider boundary.
//!
//! The game master consumes structured [`NarrativeResponse`]s. Where those
//! come from is behind the [`NarrativeProvider`] trait so the engine can run
//! against a remote model, a scripted mock, or the local fallback without
//! caring which.

use crate::dice::Advantage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a narrative provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider timed out")]
    Timeout,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// A skill check the narrative wants the player to attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedCheck {
    /// Skill name, matched case-insensitively against known skills.
    pub skill: String,
    pub dc: i32,
    /// Whether circumstances grant advantage or disadvantage on the roll.
    #[serde(default)]
    pub advantage: Advantage,
}

/// A reward the narrative wants to grant. Each is translated into a
/// pipeline action and subject to the same validation as anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProposedReward {
    Item { name: String, quantity: u32 },
    Gold { amount: u32 },
    Experience { amount: u32 },
    /// A standing change with a faction. Signed: a slight can cost as much
    /// as a favor earns.
    Reputation { faction: String, amount: i32 },
}

/// A request to move the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneChange {
    pub name: String,
    pub description: String,
}

/// A spoken line attributed to someone in the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub line: String,
}

/// One monster group to spawn when combat starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterSpawn {
    pub name: String,
    pub count: u32,
    /// Optional difficulty hint for monsters the bestiary doesn't know.
    pub challenge_rating: Option<f32>,
}

/// A request to start combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatTrigger {
    pub monsters: Vec<MonsterSpawn>,
    /// The enemies struck first; they open the encounter with the upper hand.
    #[serde(default)]
    pub ambush: bool,
}

/// Structured output of one narration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NarrativeResponse {
    /// Prose shown to the player.
    pub narration: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_check: Option<ProposedCheck>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewards: Vec<ProposedReward>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_change: Option<SceneChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialogue: Vec<DialogueLine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat: Option<CombatTrigger>,

    /// Things the player might try next.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,

    /// Explicit branching choices, when the narrative offers them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl NarrativeResponse {
    pub fn narration_only(text: impl Into<String>) -> Self {
        Self {
            narration: text.into(),
            ..Default::default()
        }
    }
}

/// Source of narrative responses.
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    /// Generate the next narrative beat from the assembled prompt.
    async fn narrate(&self, prompt: &str) -> Result<NarrativeResponse, ProviderError>;

    /// Condense a stretch of story log into a short summary.
    async fn summarize(&self, text: &str) -> Result<String, ProviderError>;
}

/// Deterministic local narration used when the provider fails or times out.
/// Keeps the session moving without pretending to know the outcome.
pub fn fallback_narration(player_action: &str) -> NarrativeResponse {
    let action = player_action.trim();
    let narration = if action.is_empty() {
        "A moment passes. The world waits to see what you will do.".to_string()
    } else {
        format!(
            "You {}. The moment hangs unresolved; the world seems to hold \
             its breath, waiting for what comes next.",
            action.trim_end_matches('.')
        )
    };
    NarrativeResponse {
        narration,
        suggested_actions: vec![
            "Look around".to_string(),
            "Press on".to_string(),
            "Wait and listen".to_string(),
        ],
        ..Default::default()
    }
}
