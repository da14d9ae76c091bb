//! GameSession - the primary public API for play.
//!
//! Wraps the narrative provider, the interpreter, and the story summarizer
//! into a single turn loop: log the player's action, build a bounded
//! prompt, call the provider under a timeout (falling back to local
//! narration on any failure), interpret the response, and adopt the new
//! state. Summarization runs in the background and never blocks a turn.

use crate::combat::CombatSession;
use crate::dice::DiceRoller;
use crate::gm::interpreter::{interpret, SkillCheckOutcome};
use crate::gm::memory::{
    build_prompt, should_summarize, summarization_input, StorySummary, SummaryCache,
};
use crate::gm::provider::{fallback_narration, NarrativeProvider};
use crate::world::{create_sample_fighter, Character, Difficulty, GameState, Scene, StoryEntry, StoryKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default provider timeout before falling back to local narration.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for creating a new game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Adventure name.
    pub adventure_name: String,

    /// Player character name, used when no custom character is supplied.
    pub character_name: String,

    /// Starting scene, when the default crossroads won't do.
    pub starting_scene: Option<Scene>,

    pub difficulty: Difficulty,

    /// How long to wait on the provider before narrating locally.
    pub provider_timeout: Duration,

    /// Fixed RNG seed for reproducible sessions.
    pub rng_seed: Option<u64>,
}

impl SessionConfig {
    pub fn new(adventure_name: impl Into<String>) -> Self {
        Self {
            adventure_name: adventure_name.into(),
            character_name: "Adventurer".to_string(),
            starting_scene: None,
            difficulty: Difficulty::Normal,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            rng_seed: None,
        }
    }

    pub fn with_character_name(mut self, name: impl Into<String>) -> Self {
        self.character_name = name.into();
        self
    }

    pub fn with_starting_scene(mut self, scene: Scene) -> Self {
        self.starting_scene = Some(scene);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// What one player turn produced.
#[derive(Debug)]
pub struct TurnReport {
    /// The narration shown to the player.
    pub narrative: String,

    /// Story entries appended this turn, in order.
    pub entries: Vec<StoryEntry>,

    /// A freshly started encounter, when the turn triggered one.
    pub combat: Option<CombatSession>,

    /// The resolved skill check, when one was proposed.
    pub check: Option<SkillCheckOutcome>,

    pub suggestions: Vec<String>,
    pub choices: Vec<String>,

    /// True when the provider failed or timed out and local narration
    /// stood in.
    pub used_fallback: bool,
}

/// An adventure session.
///
/// State mutation is single-writer: one player action at a time. The only
/// concurrent writer is the background summarizer, which merges through the
/// summary cache's monotonic rule and never touches the game state itself.
pub struct GameSession {
    provider: Arc<dyn NarrativeProvider>,
    state: GameState,
    roller: DiceRoller,
    summaries: Arc<SummaryCache>,
    summarizer: Option<JoinHandle<()>>,
    timeout: Duration,
}

impl GameSession {
    /// Create a session with a sample character.
    pub fn new(config: SessionConfig, provider: Arc<dyn NarrativeProvider>) -> Self {
        let character = create_sample_fighter(&config.character_name);
        Self::with_character(config, provider, character)
    }

    /// Create a session with a custom character.
    pub fn with_character(
        mut config: SessionConfig,
        provider: Arc<dyn NarrativeProvider>,
        character: Character,
    ) -> Self {
        let mut state = GameState::new(&config.adventure_name, character);
        state.difficulty = config.difficulty;
        if let Some(scene) = config.starting_scene.take() {
            state.scene = scene;
        }
        Self::from_parts(config, provider, state, None)
    }

    /// Resume a session from persisted state.
    pub fn resume(
        config: SessionConfig,
        provider: Arc<dyn NarrativeProvider>,
        state: GameState,
        summary: Option<StorySummary>,
    ) -> Self {
        Self::from_parts(config, provider, state, summary)
    }

    fn from_parts(
        config: SessionConfig,
        provider: Arc<dyn NarrativeProvider>,
        state: GameState,
        summary: Option<StorySummary>,
    ) -> Self {
        let roller = match config.rng_seed {
            Some(seed) => DiceRoller::seeded(seed),
            None => DiceRoller::from_entropy(),
        };
        let summaries = Arc::new(match summary {
            Some(summary) => SummaryCache::with_initial(summary),
            None => SummaryCache::new(),
        });
        Self {
            provider,
            state,
            roller,
            summaries,
            summarizer: None,
            timeout: config.provider_timeout,
        }
    }

    /// Process a player action and return the turn's outcome.
    ///
    /// This is the main gameplay loop entry point.
    pub async fn player_action(&mut self, input: &str) -> TurnReport {
        // Advance the turn before anything is logged so every entry this
        // action produces carries the same turn number.
        self.state.turn += 1;
        self.state.push_entry(StoryKind::PlayerAction, input.trim());

        let summary = self.summaries.get().await;
        let prompt = build_prompt(&self.state, summary.as_ref());

        let (response, used_fallback) =
            match tokio::time::timeout(self.timeout, self.provider.narrate(&prompt)).await {
                Ok(Ok(response)) => (response, false),
                Ok(Err(error)) => {
                    tracing::warn!(%error, "provider failed, using fallback narration");
                    (fallback_narration(input), true)
                }
                Err(_) => {
                    tracing::warn!(timeout = ?self.timeout, "provider timed out, using fallback narration");
                    (fallback_narration(input), true)
                }
            };

        let outcome = interpret(&self.state, &response, input, true, &mut self.roller);
        self.state = outcome.state;
        for reason in &outcome.rejected {
            tracing::debug!(%reason, "narrative request rejected");
        }

        self.maybe_spawn_summarizer().await;

        TurnReport {
            narrative: response.narration,
            entries: outcome.log_delta,
            combat: outcome.combat,
            check: outcome.check,
            suggestions: outcome.suggestions,
            choices: outcome.choices,
            used_fallback,
        }
    }

    /// Kick off background summarization when enough log has piled up past
    /// the cached summary. At most one task runs at a time; a task finishing
    /// after the log advanced is harmless because the cache only moves
    /// forward.
    async fn maybe_spawn_summarizer(&mut self) {
        if let Some(handle) = &self.summarizer {
            if !handle.is_finished() {
                return;
            }
        }

        let log_len = self.state.story_log.len();
        let covered = self.summaries.messages_summarized().await;
        if !should_summarize(log_len, covered) {
            return;
        }

        let text = summarization_input(&self.state, log_len);
        let start_turn = self.state.story_log.first().map(|e| e.turn).unwrap_or(0);
        let end_turn = self.state.story_log[log_len - 1].turn;
        let provider = Arc::clone(&self.provider);
        let summaries = Arc::clone(&self.summaries);

        self.summarizer = Some(tokio::spawn(async move {
            match provider.summarize(&text).await {
                Ok(summary_text) => {
                    summaries
                        .apply(StorySummary {
                            text: summary_text,
                            messages_summarized: log_len,
                            start_turn,
                            end_turn,
                        })
                        .await;
                }
                Err(error) => {
                    // Cache stays as it was; a later turn retries
                    tracing::warn!(%error, "summarization failed");
                }
            }
        }));
    }

    /// Wait for any in-flight summarization to finish. Mostly useful in
    /// tests; play never needs to.
    pub async fn flush_summarizer(&mut self) {
        if let Some(handle) = self.summarizer.take() {
            let _ = handle.await;
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access. Changes bypass validation; prefer the action
    /// pipeline.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn roller_mut(&mut self) -> &mut DiceRoller {
        &mut self.roller
    }

    pub async fn current_summary(&self) -> Option<StorySummary> {
        self.summaries.get().await
    }

    pub fn player_name(&self) -> &str {
        &self.state.character.name
    }

    pub fn current_location(&self) -> &str {
        &self.state.scene.name
    }

    pub fn in_combat(&self) -> bool {
        self.state.scene.in_combat
    }

    /// Current and maximum hit points.
    pub fn hp_status(&self) -> (i32, i32) {
        let hp = &self.state.character.hit_points;
        (hp.current, hp.maximum)
    }
}
