//! Bounded prompt building and story summarization.
//!
//! The story log grows without limit; prompts must not. With no summary the
//! prompt carries the last few entries verbatim. Once a summary exists it
//! stands in for everything it covers and only a short recent tail rides
//! along. Summarization itself happens in the background and merges through
//! a monotonic rule, so a slow summarizer can never clobber a newer one.

use crate::world::GameState;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Recent entries included verbatim when no summary exists yet.
pub const RECENT_FULL: usize = 10;

/// Recent entries appended after the summary text.
pub const RECENT_WITH_SUMMARY: usize = 5;

/// Unsummarized entries that trigger a new summarization pass.
pub const SUMMARIZE_THRESHOLD: usize = 15;

/// A condensed account of the story so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySummary {
    pub text: String,
    /// How many story entries the text accounts for.
    pub messages_summarized: usize,
    /// Turn of the first entry folded into the text.
    pub start_turn: u32,
    /// Turn of the last entry folded into the text.
    pub end_turn: u32,
}

/// True when enough of the log has accumulated past the last summary.
pub fn should_summarize(log_len: usize, messages_summarized: usize) -> bool {
    log_len.saturating_sub(messages_summarized) >= SUMMARIZE_THRESHOLD
}

/// Assemble the provider prompt: character sheet header, situation, then
/// bounded story context. Output size is independent of log length.
pub fn build_prompt(state: &GameState, summary: Option<&StorySummary>) -> String {
    let mut prompt = String::new();
    let pc = &state.character;

    prompt.push_str("## Player Character\n");
    prompt.push_str(&format!("**Name:** {}\n", pc.name));
    prompt.push_str(&format!("**Level:** {}\n", pc.level));
    prompt.push_str(&format!(
        "**HP:** {}/{}",
        pc.hit_points.current, pc.hit_points.maximum
    ));
    if pc.hit_points.temporary > 0 {
        prompt.push_str(&format!(" (+{} temp)", pc.hit_points.temporary));
    }
    prompt.push('\n');
    prompt.push_str(&format!("**AC:** {}\n", pc.armor_class));
    prompt.push_str(&format!(
        "**Abilities:** STR {} DEX {} CON {} INT {} WIS {} CHA {}\n",
        pc.ability_scores.strength,
        pc.ability_scores.dexterity,
        pc.ability_scores.constitution,
        pc.ability_scores.intelligence,
        pc.ability_scores.wisdom,
        pc.ability_scores.charisma
    ));
    prompt.push_str(&format!("**Gold:** {}\n", state.gold));

    prompt.push_str("\n## Current Situation\n");
    prompt.push_str(&format!("Location: {}\n", state.scene.name));
    if state.scene.in_combat {
        prompt.push_str("In combat.\n");
    }

    match summary {
        Some(summary) => {
            prompt.push_str("\n## Story So Far\n");
            prompt.push_str(&summary.text);
            prompt.push('\n');
            push_recent(&mut prompt, state, RECENT_WITH_SUMMARY);
        }
        None => {
            push_recent(&mut prompt, state, RECENT_FULL);
        }
    }

    prompt
}

fn push_recent(prompt: &mut String, state: &GameState, count: usize) {
    let recent = state.recent_entries(count);
    if recent.is_empty() {
        return;
    }
    prompt.push_str("\n## Recent Events\n");
    for entry in recent {
        prompt.push_str(&format!("{entry}\n"));
    }
}

/// The stretch of log a new summarization pass should cover: everything the
/// current summary already accounts for is replayed as context-free text.
pub fn summarization_input(state: &GameState, up_to: usize) -> String {
    state
        .story_log
        .iter()
        .take(up_to)
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shared summary slot. Background summarization tasks race the session
/// loop, so updates go through [`SummaryCache::apply`] and only ever move
/// coverage forward.
#[derive(Debug, Default)]
pub struct SummaryCache {
    inner: Mutex<Option<StorySummary>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-seeded with a restored summary.
    pub fn with_initial(summary: StorySummary) -> Self {
        Self {
            inner: Mutex::new(Some(summary)),
        }
    }

    pub async fn get(&self) -> Option<StorySummary> {
        self.inner.lock().await.clone()
    }

    /// Messages covered by the cached summary, zero when none.
    pub async fn messages_summarized(&self) -> usize {
        self.inner
            .lock()
            .await
            .as_ref()
            .map(|s| s.messages_summarized)
            .unwrap_or(0)
    }

    /// Install a new summary only if it covers strictly more of the log
    /// than the cached one. Returns whether the cache changed.
    pub async fn apply(&self, new: StorySummary) -> bool {
        let mut guard = self.inner.lock().await;
        let covered = guard.as_ref().map(|s| s.messages_summarized).unwrap_or(0);
        if new.messages_summarized > covered {
            *guard = Some(new);
            true
        } else {
            false
        }
    }
}
