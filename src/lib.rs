//! Rules engine and AI-narrated session layer for a tabletop adventure game.
//!
//! This crate provides:
//! - Dice mechanics with advantage, criticals, and seeded reproducibility
//! - A combat resolver for initiative, attacks, death saves, and leveling
//! - A validated action pipeline for every mechanical state change
//! - A game master layer that turns structured narrative responses into
//!   mechanics, with bounded prompts and background story summarization
//! - JSON save-game persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use adventure_core::{GameSession, SessionConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = Arc::new(my_provider());
//!     let config = SessionConfig::new("The Hollow Road")
//!         .with_character_name("Tamsin");
//!
//!     let mut session = GameSession::new(config, provider);
//!     let report = session.player_action("I look around the crossroads").await;
//!     println!("{}", report.narrative);
//! }
//! ```

pub mod actions;
pub mod bestiary;
pub mod combat;
pub mod dice;
pub mod gm;
pub mod items;
pub mod persist;
pub mod session;
pub mod testing;
pub mod world;

// Primary public API
pub use actions::{execute_all, validate, ExecutionReport, GameAction, RestKind};
pub use combat::CombatSession;
pub use dice::{Advantage, DiceError, DiceNotation, DiceRoller};
pub use gm::{NarrativeProvider, NarrativeResponse, TurnOutcome};
pub use persist::{PersistError, SaveStore, SavedGame};
pub use session::{GameSession, SessionConfig, TurnReport};
pub use world::{Character, Difficulty, GameState, Monster};
