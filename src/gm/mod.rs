//! Game master layer: narrative providers, turn interpretation, and
//! bounded story memory.

pub mod interpreter;
pub mod memory;
pub mod provider;

pub use interpreter::{interpret, SkillCheckOutcome, TurnOutcome};
pub use memory::{
    build_prompt, should_summarize, StorySummary, SummaryCache, RECENT_FULL, RECENT_WITH_SUMMARY,
    SUMMARIZE_THRESHOLD,
};
pub use provider::{
    fallback_narration, CombatTrigger, DialogueLine, MonsterSpawn, NarrativeProvider,
    NarrativeResponse, ProposedCheck, ProposedReward, ProviderError, SceneChange,
};
