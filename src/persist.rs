//! Save-game persistence.
//!
//! Saves are plain JSON files in a directory, one per game, named by game
//! id. Every save carries a format version and lightweight metadata that
//! can be read without deserializing the whole state. Failures surface as
//! errors and never corrupt the in-memory game.

use crate::gm::memory::StorySummary;
use crate::world::{unix_now, GameId, GameState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save not found: {0}")]
    NotFound(GameId),

    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save file version.
const SAVE_VERSION: u32 = 1;

/// A saved game with everything needed to resume play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// Unix seconds when the save was written.
    pub saved_at: u64,

    /// The complete game state.
    pub state: GameState,

    /// Cached story summary, when one existed at save time.
    pub summary: Option<StorySummary>,

    /// Quick-access metadata, duplicated for cheap listing.
    pub metadata: SaveMetadata,
}

/// Metadata about a save, readable without parsing the full state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub adventure_name: String,
    pub character_name: String,
    pub level: u8,
    pub location: String,
    pub turn: u32,
}

impl SavedGame {
    pub fn new(state: GameState, summary: Option<StorySummary>) -> Self {
        let metadata = SaveMetadata {
            adventure_name: state.adventure_name.clone(),
            character_name: state.character.name.clone(),
            level: state.character.level,
            location: state.scene.name.clone(),
            turn: state.turn,
        };
        Self {
            version: SAVE_VERSION,
            saved_at: unix_now(),
            state,
            summary,
            metadata,
        }
    }
}

/// A listed save: the id plus its metadata.
#[derive(Debug, Clone)]
pub struct SaveSummary {
    pub id: GameId,
    pub saved_at: u64,
    pub metadata: SaveMetadata,
}

/// Directory-backed save storage.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: GameId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write a save for the game, creating the directory if needed.
    /// Overwrites any previous save of the same game.
    pub async fn save(&self, saved: &SavedGame) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(saved.state.id);
        let content = serde_json::to_string_pretty(saved)?;
        fs::write(&path, content).await?;
        tracing::info!(id = %saved.state.id, path = %path.display(), "game saved");
        Ok(())
    }

    /// Load a save by game id.
    pub async fn load(&self, id: GameId) -> Result<SavedGame, PersistError> {
        let path = self.path_for(id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistError::NotFound(id))
            }
            Err(e) => return Err(e.into()),
        };
        let saved: SavedGame = serde_json::from_str(&content)?;
        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }
        Ok(saved)
    }

    /// Delete a save by game id.
    pub async fn delete(&self, id: GameId) -> Result<(), PersistError> {
        let path = self.path_for(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PersistError::NotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a save's metadata without deserializing the full state.
    pub async fn peek_metadata(&self, id: GameId) -> Result<SaveMetadata, PersistError> {
        let path = self.path_for(id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistError::NotFound(id))
            }
            Err(e) => return Err(e.into()),
        };

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        if partial.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }
        Ok(partial.metadata)
    }

    /// List every readable save in the directory, most recent first.
    /// Unreadable or foreign files are skipped, not errors.
    pub async fn list(&self) -> Result<Vec<SaveSummary>, PersistError> {
        let mut saves = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(saves),
            Err(e) => return Err(e.into()),
        };

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            saved_at: u64,
            metadata: SaveMetadata,
        }

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let Some(id) = parse_save_id(&path) else {
                    continue;
                };
                let Ok(content) = fs::read_to_string(&path).await else {
                    continue;
                };
                let Ok(partial) = serde_json::from_str::<Partial>(&content) else {
                    continue;
                };
                if partial.version != SAVE_VERSION {
                    continue;
                }
                saves.push(SaveSummary {
                    id,
                    saved_at: partial.saved_at,
                    metadata: partial.metadata,
                });
            }
        }

        saves.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(saves)
    }
}

fn parse_save_id(path: &Path) -> Option<GameId> {
    let stem = path.file_stem()?.to_str()?;
    stem.parse::<uuid::Uuid>().ok().map(GameId)
}
