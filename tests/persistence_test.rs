//! Saving and restoring the cube and progress through the data directory.

use std::fs;

use tempfile::TempDir;

use cube_tutor::app::App;
use cube_tutor::config::{AppConfig, Cli};
use cube_tutor::core::{CubeEngine, Faces, PersistedState};
use cube_tutor::store::Store;
use cube_tutor::types::{InputCommand, Move, SessionMode};

fn config(dir: &TempDir) -> AppConfig {
    AppConfig::from_sources(
        Cli {
            data_dir: Some(dir.path().to_path_buf()),
            seed: Some(1),
            no_ai: true,
            ..Cli::default()
        },
        |_| None,
    )
}

fn open(dir: &TempDir) -> Store {
    Store::open(dir.path()).unwrap()
}

#[test]
fn test_app_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir);

    let mut app = App::load(&cfg, Some(open(&dir)), 0).unwrap();
    app.apply(InputCommand::SetMode(SessionMode::Free), 0, false);
    for token in ["R", "U", "F'"] {
        app.apply(InputCommand::Move(Move::parse(token).unwrap()), 0, false);
    }
    let faces = *app.engine().faces();
    app.save().unwrap();

    let app = App::load(&cfg, Some(open(&dir)), 0).unwrap();
    assert_eq!(*app.engine().faces(), faces);
    assert_eq!(app.engine().move_count(), 3);
    assert_eq!(app.engine().history_len(), 3);
    assert_eq!(app.engine().mode(), SessionMode::Free);
    assert_eq!(app.progress().total_moves, 3);
}

#[test]
fn test_fresh_flag_ignores_saved_cube() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let mut engine = CubeEngine::new();
    engine.apply_notation("L").unwrap();
    store.save_state(&engine.to_persisted()).unwrap();

    let mut cfg = config(&dir);
    cfg.fresh = true;
    let app = App::load(&cfg, Some(open(&dir)), 0).unwrap();
    assert!(app.engine().is_solved());
    assert_eq!(app.engine().move_count(), 0);
}

#[test]
fn test_partial_record_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    fs::write(store.state_path(), r#"{"mode":"practice"}"#).unwrap();

    let state = store.load_state().unwrap().unwrap();
    assert_eq!(state.mode, SessionMode::Practice);
    assert_eq!(state.faces, Faces::solved());
    assert!(state.moves.is_empty());
    assert_eq!(state.current_step, 0);
}

#[test]
fn test_malformed_record_yields_default() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    fs::write(store.state_path(), "[1, 2").unwrap();
    assert_eq!(store.load_state().unwrap(), Some(PersistedState::default()));
}

#[test]
fn test_mismatched_history_is_discarded() {
    let mut engine = CubeEngine::new();
    engine.apply_notation("D").unwrap();
    engine.apply_notation("B").unwrap();
    let mut state = engine.to_persisted();
    state.history.pop();

    let mut restored = CubeEngine::from_persisted(state, 0);
    assert_eq!(restored.faces(), engine.faces());
    assert_eq!(restored.move_count(), 0);
    assert_eq!(restored.history_len(), 0);
    assert!(!restored.undo());
}

#[test]
fn test_practice_clock_resumes() {
    let mut engine = CubeEngine::new();
    engine.toggle_mode(SessionMode::Practice, 1_000);
    engine.apply_notation("R").unwrap();
    engine.tick(4_000);
    let state = engine.to_persisted();
    assert_eq!(state.elapsed_ms, 3_000);

    let mut restored = CubeEngine::from_persisted(state, 100_000);
    assert_eq!(restored.elapsed_ms(), 3_000);
    restored.tick(101_000);
    assert_eq!(restored.elapsed_ms(), 4_000);
}

#[test]
fn test_progress_file_written() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir);
    let mut app = App::load(&cfg, Some(open(&dir)), 0).unwrap();
    app.apply(InputCommand::Move(Move::parse("U").unwrap()), 0, false);
    app.save_if_dirty().unwrap();
    assert!(!app.is_dirty());

    let raw = fs::read_to_string(open(&dir).progress_path()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["total_moves"], 1);
    assert_eq!(v["achievements"][0], "first-move");
}
