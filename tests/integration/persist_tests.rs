use std::fs;

use rustwalk::error::{ConfigError, NavError};
use rustwalk::nav::{
    ActiveState, FilterDef, FilterDefinitions, FilterKind, PrimarySession, ResumeInfo,
    ResumeSession, ResumeStrategy, Restorer, Subscription, TraverseOptions,
};
use rustwalk::signal::CancelToken;
use rustwalk::text::NavContext;
use tempfile::TempDir;

use super::fixture::{MusicTree, Recorder};

fn info(path: std::path::PathBuf, restorer: Option<Restorer>) -> ResumeInfo {
    ResumeInfo {
        path,
        strategy: ResumeStrategy::Fastward,
        restorer,
    }
}

fn noop_restorer() -> Restorer {
    Box::new(|options: &mut TraverseOptions, _: &mut ActiveState| {
        options.callback = TraverseOptions::with_callback(|_| Ok(())).callback;
        Ok(())
    })
}

#[test]
fn test_saved_store_survives_resume() {
    let tree = MusicTree::new();
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("flac.json");

    let cancel = CancelToken::new();
    let trip = cancel.clone();
    let mut options = TraverseOptions::with_callback(move |item| {
        if item.name() == "02 - Night Drive.flac" {
            trip.cancel();
        }
        Ok(())
    });
    options.store.subscription = Subscription::Files;
    options.store.filter_defs = Some(FilterDefinitions {
        node: Some(FilterDef::new(FilterKind::Glob, "*.flac")),
        children: None,
    });
    options.cancel = cancel;
    let mut session = PrimarySession::new(&NavContext::default(), tree.root(), options).unwrap();
    let first = session.run();
    assert!(matches!(first.error, Some(NavError::Cancelled)));
    session.save(&state).unwrap();

    let recorder = Recorder::new();
    let sink = recorder.clone();
    let restorer: Restorer = Box::new(move |options: &mut TraverseOptions, _: &mut ActiveState| {
        assert_eq!(options.store.subscription, Subscription::Files);
        options.callback = Some(sink.callback());
        Ok(())
    });
    let mut resumed = ResumeSession::new(&NavContext::default(), info(state, Some(restorer))).unwrap();
    let result = resumed.run();

    assert!(result.is_ok());
    assert!(recorder.names().iter().all(|n| n.ends_with(".flac")));
    assert_eq!(
        recorder.names().first().map(String::as_str),
        Some("03 - Tick of the Clock.flac")
    );
    assert_eq!(result.metrics.files(), 11);
}

#[test]
fn test_state_file_is_json_with_store_and_active() {
    let tree = MusicTree::new();
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("nested").join("walk.json");

    let options = TraverseOptions::with_callback(|_| Ok(()));
    let mut session = PrimarySession::new(&NavContext::default(), tree.root(), options).unwrap();
    session.run();
    session.save(&state).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(json["store"]["subscription"], "any");
    assert_eq!(json["active"]["listen"], "active");
    assert!(json["active"]["saved_at"].is_string());
}

#[test]
fn test_unsupported_state_extension() {
    let err = ResumeSession::new(
        &NavContext::default(),
        info("walk.yaml".into(), Some(noop_restorer())),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedPersistFormat(format) if format == "yaml"));
}

#[test]
fn test_corrupted_state_file() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("walk.json");
    fs::write(&state, "{ \"store\": {}, \"active\": ").unwrap();

    let err = ResumeSession::new(&NavContext::default(), info(state, Some(noop_restorer()))).unwrap_err();
    assert!(matches!(err, ConfigError::PersistedState { .. }));
}

#[test]
fn test_missing_state_file() {
    let dir = TempDir::new().unwrap();
    let err = ResumeSession::new(
        &NavContext::default(),
        info(dir.path().join("absent.json"), Some(noop_restorer())),
    )
    .unwrap_err();
    assert!(err.to_string().contains("failed to read state"));
}

#[test]
fn test_resume_without_restorer() {
    let tree = MusicTree::new();
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("walk.json");
    let session = PrimarySession::new(
        &NavContext::default(),
        tree.root(),
        TraverseOptions::with_callback(|_| Ok(())),
    )
    .unwrap();
    session.save(&state).unwrap();

    let err = ResumeSession::new(&NavContext::default(), info(state, None)).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRestorer));
}

#[test]
fn test_restorer_error_is_returned() {
    let tree = MusicTree::new();
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("walk.json");
    let session = PrimarySession::new(
        &NavContext::default(),
        tree.root(),
        TraverseOptions::with_callback(|_| Ok(())),
    )
    .unwrap();
    session.save(&state).unwrap();

    let restorer: Restorer = Box::new(|_: &mut TraverseOptions, _: &mut ActiveState| {
        Err(ConfigError::Restore("database offline".into()))
    });
    let err = ResumeSession::new(&NavContext::default(), info(state, Some(restorer))).unwrap_err();
    assert!(err.to_string().contains("database offline"));
}
