use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use rustwalk::config::WalkConfig;
use rustwalk::nav::{PrimarySession, SampleType, Subscription, TraverseOptions};
use rustwalk::text::NavContext;
use std::fs;
use tempfile::tempdir;

use super::fixture::{MusicTree, Recorder};

const WALK_TOML: &str = r#"
subscription = "files"
state_file = "/tmp/rustwalk-state.json"

[filter_defs.node]
kind = "glob"
pattern = "*.flac"

[sampling]
sample_type = "slice"
in_reverse = true

[sampling.no_of]
files = 1

[behaviours.sort]
case_sensitive = true
"#;

#[test]
fn test_config_defaults_without_env() {
    let figment = Figment::from(Serialized::defaults(WalkConfig::default()));
    let config: WalkConfig = figment.extract().unwrap();
    assert_eq!(config.store.subscription, Subscription::Any);
    assert!(config.state_file.is_none());
    assert!(!config.store.acceleration.enabled);
}

#[test]
fn test_config_file_drives_walk() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("rustwalk.toml");
    fs::write(&config_path, WALK_TOML).unwrap();

    let figment = Figment::from(Serialized::defaults(WalkConfig::default()))
        .merge(Toml::file(&config_path));
    let config: WalkConfig = figment.extract().unwrap();
    assert_eq!(config.store.subscription, Subscription::Files);
    assert_eq!(config.store.sampling.unwrap().sample_type, SampleType::Slice);
    assert!(config.store.behaviours.sort.case_sensitive);
    assert!(config.state_file.is_some());

    let tree = MusicTree::new();
    let recorder = Recorder::new();
    let options = TraverseOptions {
        store: config.store,
        callback: Some(recorder.callback()),
        ..TraverseOptions::default()
    };
    let mut session = PrimarySession::new(&NavContext::default(), tree.root(), options).unwrap();
    let result = session.run();

    assert!(result.is_ok());
    // Only Teenage Color ends in a track; the other albums end with a cover.
    assert_eq!(recorder.names(), vec!["02 - Kind of Life.flac"]);
}

#[test]
fn test_config_load_reads_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("walk.toml");
    fs::write(&config_path, WALK_TOML).unwrap();

    let config = WalkConfig::load(Some(&config_path)).unwrap();
    assert_eq!(config.store.sampling.unwrap().no_of.files, Some(1));
}
