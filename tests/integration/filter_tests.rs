use std::sync::{Arc, Mutex};

use rustwalk::error::ConfigError;
use rustwalk::nav::{
    CompoundFilterDef, CompoundFilterKind, FilterDef, FilterDefinitions, FilterKind, FilterScope,
    ListenPredicate, PrimarySession, SampleQuota, SampleType, SamplingIteration, SamplingOptions,
    Subscription, TraverseItem, TraverseOptions, TraverseResult, TriStateBool,
};
use rustwalk::text::NavContext;

use super::fixture::{full_walk, MusicTree, Recorder};

fn walk(tree: &MusicTree, mut options: TraverseOptions) -> (Recorder, TraverseResult) {
    let recorder = Recorder::new();
    options.callback = Some(recorder.callback());
    let mut session = PrimarySession::new(&NavContext::default(), tree.root(), options).unwrap();
    let result = session.run();
    (recorder, result)
}

fn node_filter(def: FilterDef) -> Option<FilterDefinitions> {
    Some(FilterDefinitions {
        node: Some(def),
        children: None,
    })
}

#[test]
fn test_listening_window() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.listen_defs.start_at = Some(FilterDef::new(FilterKind::Glob, "Night Drive"));
    options.store.listen_defs.stop_at = Some(FilterDef::new(FilterKind::Glob, "Electric Youth"));
    let (recorder, result) = walk(&tree, options);

    let all = full_walk();
    let start = all.iter().position(|n| *n == "Night Drive").unwrap();
    let stop = all.iter().position(|n| *n == "Electric Youth").unwrap();
    assert_eq!(recorder.names(), all[start..stop].to_vec());
    assert!(result.is_ok());
    assert_eq!(result.metrics.folders(), 4);
    assert_eq!(result.metrics.files(), 10);
}

#[test]
fn test_listening_exclusive_start_inclusive_stop() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Folders;
    options.store.behaviours.listen.inclusive_start = false;
    options.store.behaviours.listen.inclusive_stop = true;
    options.listen.start = Some(ListenPredicate::new("chromatics", |item: &TraverseItem| {
        item.name() == "Chromatics"
    }));
    options.listen.stop = Some(ListenPredicate::new("teenage", |item: &TraverseItem| {
        item.name() == "Teenage Color"
    }));
    let (recorder, _) = walk(&tree, options);

    assert_eq!(
        recorder.names(),
        vec!["Night Drive", "College", "Northern Council", "Teenage Color"]
    );
}

#[test]
fn test_listen_notifications() {
    let tree = MusicTree::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut options = TraverseOptions::default();
    options.store.listen_defs.start_at = Some(FilterDef::new(FilterKind::Glob, "College"));
    options.store.listen_defs.stop_at = Some(FilterDef::new(FilterKind::Glob, "Innerworld"));
    let sink = Arc::clone(&events);
    options.notify.on_start = Some(Arc::new(move |name: &str| {
        sink.lock().unwrap().push(format!("start:{name}"))
    }));
    let sink = Arc::clone(&events);
    options.notify.on_stop = Some(Arc::new(move |name: &str| {
        sink.lock().unwrap().push(format!("stop:{name}"))
    }));
    walk(&tree, options);

    assert_eq!(
        *events.lock().unwrap(),
        vec!["start:College".to_string(), "stop:Innerworld".to_string()]
    );
}

#[test]
fn test_glob_filter_with_scope() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.filter_defs = node_filter(
        FilterDef::new(FilterKind::Glob, "*")
            .with_scope(FilterScope::TOP)
            .if_not_applicable(TriStateBool::False),
    );
    let (recorder, _) = walk(&tree, options);

    assert_eq!(
        recorder.names(),
        vec!["Chromatics", "College", "Electric Youth"]
    );
}

#[test]
fn test_negated_regex_filter() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    options.store.filter_defs =
        node_filter(FilterDef::new(FilterKind::Regex, r"\.flac$").negated());
    let (recorder, result) = walk(&tree, options);

    assert_eq!(
        recorder.names(),
        vec![
            "cover.night-drive.jpg",
            "cover.northern-council.jpg",
            "cover.innerworld.jpg"
        ]
    );
    assert_eq!(result.metrics.files(), 3);
}

#[test]
fn test_poly_filter_selects_files_by_folder() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    options.store.filter_defs = node_filter(FilterDef::poly(
        FilterDef::new(FilterKind::Glob, "*.flac"),
        FilterDef::new(FilterKind::Glob, "N*"),
    ));
    let (recorder, result) = walk(&tree, options);

    assert_eq!(
        recorder.names(),
        vec![
            "01 - The Telephone Call.flac",
            "02 - Night Drive.flac",
            "03 - Tick of the Clock.flac",
            "04 - Lady.flac",
            "01 - Northern Council.flac",
            "02 - The Energy.flac",
        ]
    );
    assert_eq!(result.metrics.folders(), 0);
}

#[test]
fn test_negated_poly_filter_hides_selected_files() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    options.store.filter_defs = node_filter(
        FilterDef::poly(
            FilterDef::new(FilterKind::Glob, "*.flac"),
            FilterDef::new(FilterKind::Glob, "N*"),
        )
        .negated(),
    );
    let (recorder, result) = walk(&tree, options);

    assert!(recorder.contains("cover.night-drive.jpg"));
    assert!(recorder.contains("01 - Runaway.flac"));
    assert!(!recorder.contains("02 - Night Drive.flac"));
    assert!(!recorder.contains("01 - Northern Council.flac"));
    assert_eq!(result.metrics.files(), 8);
}

#[test]
fn test_invalid_glob_fails_at_construction() {
    let mut options = TraverseOptions::with_callback(|_| Ok(()));
    options.store.filter_defs = node_filter(FilterDef::new(FilterKind::Glob, "[unclosed"));
    let err = PrimarySession::new(&NavContext::default(), "/music", options).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidGlob { .. }));
}

#[test]
fn test_children_filter_restricts_files() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.filter_defs = Some(FilterDefinitions {
        node: None,
        children: Some(CompoundFilterDef::new(CompoundFilterKind::Glob, "*.jpg")),
    });
    let (recorder, result) = walk(&tree, options);

    assert!(!recorder.names().iter().any(|n| n.ends_with(".flac")));
    assert_eq!(result.metrics.files(), 3);
    assert_eq!(result.metrics.folders(), 8);
}

#[test]
fn test_folders_with_files_attach_filtered_files() {
    let tree = MusicTree::new();
    let attached = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&attached);
    let mut options = TraverseOptions::with_callback(move |item| {
        let files: Vec<String> = item.children().iter().map(|e| e.name.clone()).collect();
        sink.lock().unwrap().push((item.name(), files));
        Ok(())
    });
    options.store.subscription = Subscription::FoldersWithFiles;
    options.store.filter_defs = Some(FilterDefinitions {
        node: None,
        children: Some(CompoundFilterDef::new(CompoundFilterKind::Glob, "*.flac")),
    });
    let mut session = PrimarySession::new(&NavContext::default(), tree.root(), options).unwrap();
    let result = session.run();

    assert_eq!(result.metrics.files(), 0);
    assert_eq!(result.metrics.folders(), 8);
    let attached = attached.lock().unwrap();
    let (_, root_files) = &attached[0];
    assert!(root_files.is_empty());
    let (_, innerworld) = attached
        .iter()
        .find(|(name, _)| name == "Innerworld")
        .unwrap();
    assert_eq!(
        innerworld,
        &vec![
            "01 - Runaway.flac".to_string(),
            "02 - Innocence.flac".to_string(),
            "03 - Modern Wildlife.flac".to_string(),
        ]
    );
}

fn sampled(quota: SampleQuota, in_reverse: bool, sample_type: SampleType) -> SamplingOptions {
    SamplingOptions {
        sample_type,
        in_reverse,
        no_of: quota,
    }
}

#[test]
fn test_sampling_first_files() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    options.store.sampling = Some(sampled(
        SampleQuota {
            files: Some(2),
            folders: None,
        },
        false,
        SampleType::Slice,
    ));
    let (recorder, result) = walk(&tree, options);

    assert!(recorder.contains("01 - Runaway.flac"));
    assert!(recorder.contains("02 - Innocence.flac"));
    assert!(!recorder.contains("03 - Modern Wildlife.flac"));
    assert!(!recorder.contains("cover.innerworld.jpg"));
    // Two files from each of the four albums.
    assert_eq!(result.metrics.files(), 8);
}

#[test]
fn test_sampling_last_files() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    options.store.sampling = Some(sampled(
        SampleQuota {
            files: Some(2),
            folders: None,
        },
        true,
        SampleType::Slice,
    ));
    let (recorder, _) = walk(&tree, options);

    let names = recorder.names();
    assert_eq!(
        names[names.len() - 2..].to_vec(),
        vec!["03 - Modern Wildlife.flac", "cover.innerworld.jpg"]
    );
    assert!(!recorder.contains("01 - Runaway.flac"));
    assert!(!recorder.contains("02 - Innocence.flac"));
}

#[test]
fn test_sampling_folders() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Folders;
    options.store.sampling = Some(sampled(
        SampleQuota {
            files: None,
            folders: Some(1),
        },
        false,
        SampleType::Slice,
    ));
    let (recorder, _) = walk(&tree, options);

    assert_eq!(
        recorder.names(),
        vec![super::fixture::ROOT, "Chromatics", "Night Drive"]
    );
}

#[test]
fn test_filter_sampling_counts_matching_only() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    options.store.filter_defs = node_filter(FilterDef::new(FilterKind::Glob, "*.flac"));
    options.store.sampling = Some(sampled(
        SampleQuota {
            files: Some(2),
            folders: None,
        },
        true,
        SampleType::Filter,
    ));
    let (recorder, result) = walk(&tree, options);

    assert!(recorder.contains("02 - Innocence.flac"));
    assert!(recorder.contains("03 - Modern Wildlife.flac"));
    assert!(!recorder.contains("cover.innerworld.jpg"));
    assert!(!recorder.contains("01 - Runaway.flac"));
    // Teenage Color only has two tracks; every other album has more.
    assert_eq!(result.metrics.files(), 8);
}

#[test]
fn test_custom_sampling() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    options.store.sampling = Some(sampled(
        SampleQuota {
            files: Some(1),
            folders: None,
        },
        false,
        SampleType::Custom,
    ));
    options.iteration = Some(SamplingIteration {
        each: Arc::new(|item: &TraverseItem| item.name().starts_with("cover")),
        while_: None,
    });
    let (recorder, _) = walk(&tree, options);

    assert_eq!(
        recorder.names(),
        vec![
            "cover.night-drive.jpg",
            "cover.northern-council.jpg",
            "cover.innerworld.jpg"
        ]
    );
}

#[test]
fn test_custom_sampling_requires_iteration() {
    let mut options = TraverseOptions::with_callback(|_| Ok(()));
    options.store.sampling = Some(sampled(SampleQuota::default(), false, SampleType::Custom));
    let err = PrimarySession::new(&NavContext::default(), "/music", options).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidFilterDef(_)));
}
