//! Testing utilities.
//!
//! Deterministic stand-ins for the narrative provider so integration tests
//! can drive full sessions without a network:
//! - [`MockProvider`] returns scripted responses in order
//! - [`FailingProvider`] always errors, for fallback paths
//! - [`SlowProvider`] sleeps past any reasonable timeout
//! plus assertion helpers for common state checks.

use crate::gm::provider::{NarrativeProvider, NarrativeResponse, ProviderError};
use crate::world::GameState;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A provider that returns scripted responses in order.
///
/// Once the script runs out it keeps returning a flat default so a test
/// that takes one extra turn fails on its assertion, not on a panic.
pub struct MockProvider {
    responses: Mutex<Vec<NarrativeResponse>>,
    summary_text: String,
    /// Prompts received by `narrate`, for asserting on prompt content.
    prompts: Mutex<Vec<String>>,
    /// Texts received by `summarize`.
    summarize_calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(mut responses: Vec<NarrativeResponse>) -> Self {
        // Stored reversed so pop() serves them in script order
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            summary_text: "The story so far, in brief.".to_string(),
            prompts: Mutex::new(Vec::new()),
            summarize_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_summary_text(mut self, text: impl Into<String>) -> Self {
        self.summary_text = text.into();
        self
    }

    /// Prompts passed to `narrate`, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of times `summarize` was called.
    pub fn summarize_count(&self) -> usize {
        self.summarize_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NarrativeProvider for MockProvider {
    async fn narrate(&self, prompt: &str) -> Result<NarrativeResponse, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.responses.lock().unwrap().pop();
        Ok(next.unwrap_or_else(|| {
            NarrativeResponse::narration_only("The scripted story has run out.")
        }))
    }

    async fn summarize(&self, text: &str) -> Result<String, ProviderError> {
        self.summarize_calls.lock().unwrap().push(text.to_string());
        Ok(self.summary_text.clone())
    }
}

/// A provider whose every call fails.
pub struct FailingProvider;

#[async_trait]
impl NarrativeProvider for FailingProvider {
    async fn narrate(&self, _prompt: &str) -> Result<NarrativeResponse, ProviderError> {
        Err(ProviderError::Unavailable("scripted failure".to_string()))
    }

    async fn summarize(&self, _text: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Unavailable("scripted failure".to_string()))
    }
}

/// A provider that sleeps long enough to trip any sane timeout.
pub struct SlowProvider {
    pub delay: Duration,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl NarrativeProvider for SlowProvider {
    async fn narrate(&self, _prompt: &str) -> Result<NarrativeResponse, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(NarrativeResponse::narration_only("...finally."))
    }

    async fn summarize(&self, _text: &str) -> Result<String, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok("...eventually.".to_string())
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert the character's current hit points.
#[track_caller]
pub fn assert_hp(state: &GameState, expected: i32) {
    assert_eq!(
        state.character.hit_points.current, expected,
        "expected {} to have {expected} HP, found {}",
        state.character.name, state.character.hit_points.current
    );
}

/// Assert the party gold total.
#[track_caller]
pub fn assert_gold(state: &GameState, expected: u32) {
    assert_eq!(
        state.gold, expected,
        "expected {expected} gold, found {}",
        state.gold
    );
}

/// Assert the inventory holds at least `quantity` of an item.
#[track_caller]
pub fn assert_has_item(state: &GameState, name: &str, quantity: u32) {
    let found = state
        .inventory
        .find_item(name)
        .map(|i| i.quantity)
        .unwrap_or(0);
    assert!(
        found >= quantity,
        "expected at least {quantity}x {name}, found {found}"
    );
}

/// Assert some story entry contains the given text.
#[track_caller]
pub fn assert_log_contains(state: &GameState, needle: &str) {
    assert!(
        state.story_log.iter().any(|e| e.content.contains(needle)),
        "no story entry contains {needle:?}"
    );
}
