//! QA tests for save-game persistence and serde round trips.

use adventure_core::actions::{execute_all, GameAction};
use adventure_core::dice::DiceRoller;
use adventure_core::gm::StorySummary;
use adventure_core::persist::{PersistError, SaveStore, SavedGame};
use adventure_core::world::{create_sample_fighter, GameState, Quest, StoryKind};
use tempfile::TempDir;

fn played_state() -> GameState {
    let mut state = GameState::new("The Hollow Road", create_sample_fighter("Tamsin"));
    state.quests.push(Quest::new(
        "Find the ferryman",
        "Someone must still run the crossing.",
    ));
    state.push_entry(StoryKind::PlayerAction, "head for the river");
    state.push_entry(StoryKind::Narration, "The water is higher than it should be.");
    state.flags.insert("met_ferryman".to_string(), false);

    let mut roller = DiceRoller::seeded(301);
    let report = execute_all(
        state,
        vec![
            GameAction::AddGold { amount: 40 },
            GameAction::AddItem {
                name: "Healing Potion".to_string(),
                quantity: 2,
            },
        ],
        &mut roller,
    );
    report.state
}

// =============================================================================
// Serde round trips
// =============================================================================

#[test]
fn test_game_state_json_round_trip() {
    let state = played_state();
    let json = serde_json::to_string_pretty(&state).expect("serialize");
    let back: GameState = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(state, back);
}

#[test]
fn test_saved_game_embeds_summary() {
    let saved = SavedGame::new(
        played_state(),
        Some(StorySummary {
            text: "A flooded road and a missing ferryman.".to_string(),
            messages_summarized: 2,
            start_turn: 0,
            end_turn: 1,
        }),
    );
    let json = serde_json::to_string(&saved).expect("serialize");
    let back: SavedGame = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.summary, saved.summary);
    assert_eq!(back.state, saved.state);
}

// =============================================================================
// Store lifecycle
// =============================================================================

#[tokio::test]
async fn test_full_save_load_resume_cycle() {
    let dir = TempDir::new().expect("temp dir");
    let store = SaveStore::new(dir.path());

    let state = played_state();
    let id = state.id;
    let gold = state.gold;
    store
        .save(&SavedGame::new(state, None))
        .await
        .expect("save");

    let loaded = store.load(id).await.expect("load");
    assert_eq!(loaded.state.gold, gold);
    assert_eq!(loaded.state.quests.len(), 1);
    assert!(loaded.state.inventory.has_item("healing potion"));

    // Keep playing from the loaded state and save again
    let mut roller = DiceRoller::seeded(302);
    let report = execute_all(
        loaded.state,
        vec![GameAction::SpendGold { amount: 10 }],
        &mut roller,
    );
    store
        .save(&SavedGame::new(report.state, None))
        .await
        .expect("resave");

    let reloaded = store.load(id).await.expect("reload");
    assert_eq!(reloaded.state.gold, gold - 10);
}

#[tokio::test]
async fn test_list_and_delete() {
    let dir = TempDir::new().expect("temp dir");
    let store = SaveStore::new(dir.path());

    let first = played_state();
    let second = GameState::new("Another Tale", create_sample_fighter("Bryn"));
    let second_id = second.id;

    store.save(&SavedGame::new(first, None)).await.expect("save");
    store
        .save(&SavedGame::new(second, None))
        .await
        .expect("save");

    let listing = store.list().await.expect("list");
    assert_eq!(listing.len(), 2);
    assert!(listing
        .iter()
        .any(|s| s.metadata.adventure_name == "Another Tale"));

    store.delete(second_id).await.expect("delete");
    let listing = store.list().await.expect("list");
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].metadata.adventure_name, "The Hollow Road");
}

#[tokio::test]
async fn test_failed_load_leaves_caller_state_alone() {
    let dir = TempDir::new().expect("temp dir");
    let store = SaveStore::new(dir.path());

    // A game in memory, never saved
    let state = played_state();
    let before = state.clone();

    let missing = store.load(adventure_core::world::GameId::new()).await;
    assert!(matches!(missing, Err(PersistError::NotFound(_))));

    // Nothing about the in-memory game changed
    assert_eq!(state, before);
}

#[tokio::test]
async fn test_peek_reads_metadata_only() {
    let dir = TempDir::new().expect("temp dir");
    let store = SaveStore::new(dir.path());

    let state = played_state();
    let id = state.id;
    store.save(&SavedGame::new(state, None)).await.expect("save");

    let metadata = store.peek_metadata(id).await.expect("peek");
    assert_eq!(metadata.character_name, "Tamsin");
    assert_eq!(metadata.adventure_name, "The Hollow Road");
    assert_eq!(metadata.location, "The Crossroads");
}
