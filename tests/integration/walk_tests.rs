use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rustwalk::error::NavError;
use rustwalk::nav::{
    Hooks, Notifications, PrimarySession, Subscription, TraverseItem, TraverseOptions,
};
use rustwalk::signal::CancelToken;
use rustwalk::text::NavContext;

use super::fixture::{full_walk, MusicTree, Recorder, FILES, FOLDERS, ROOT};

fn walk(tree: &MusicTree, mut options: TraverseOptions) -> (Recorder, rustwalk::nav::TraverseResult) {
    let recorder = Recorder::new();
    if options.callback.is_none() {
        options.callback = Some(recorder.callback());
    }
    let mut session = PrimarySession::new(&NavContext::default(), tree.root(), options).unwrap();
    let result = session.run();
    (recorder, result)
}

#[test]
fn test_universal_walk_visits_everything_in_order() {
    let tree = MusicTree::new();
    let (recorder, result) = walk(&tree, TraverseOptions::default());

    assert!(result.is_ok());
    assert_eq!(recorder.names(), full_walk());
    assert_eq!(result.metrics.folders(), FOLDERS);
    assert_eq!(result.metrics.files(), FILES);
}

#[test]
fn test_folders_subscription() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Folders;
    let (recorder, result) = walk(&tree, options);

    assert_eq!(
        recorder.names(),
        vec![
            ROOT,
            "Chromatics",
            "Night Drive",
            "College",
            "Northern Council",
            "Teenage Color",
            "Electric Youth",
            "Innerworld",
        ]
    );
    assert_eq!(result.metrics.files(), 0);
    assert_eq!(result.metrics.folders(), FOLDERS);
}

#[test]
fn test_files_subscription() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::default();
    options.store.subscription = Subscription::Files;
    let (recorder, result) = walk(&tree, options);

    let expected: Vec<&str> = full_walk()
        .into_iter()
        .filter(|n| n.contains('.'))
        .collect();
    assert_eq!(recorder.names(), expected);
    assert_eq!(result.metrics.folders(), 0);
    assert_eq!(result.metrics.files(), FILES);
}

#[test]
fn test_skip_dir_on_folder_skips_descendants_only() {
    let tree = MusicTree::new();
    let recorder = Recorder::new();
    let sink = recorder.clone();
    let options = TraverseOptions::with_callback(move |item| {
        sink.record(item.name());
        if item.name() == "College" {
            Err(NavError::SkipDir)
        } else {
            Ok(())
        }
    });
    let (_, result) = walk(&tree, options);

    assert!(result.is_ok());
    assert!(recorder.contains("College"));
    for skipped in [
        "Northern Council",
        "01 - Northern Council.flac",
        "Teenage Color",
        "02 - Kind of Life.flac",
    ] {
        assert!(!recorder.contains(skipped), "{skipped} should be skipped");
    }
    assert!(recorder.contains("Electric Youth"));
    assert!(recorder.contains("cover.innerworld.jpg"));
    assert_eq!(recorder.names().len(), full_walk().len() - 7);
}

#[test]
fn test_skip_dir_on_file_skips_remaining_siblings() {
    let tree = MusicTree::new();
    let recorder = Recorder::new();
    let sink = recorder.clone();
    let options = TraverseOptions::with_callback(move |item| {
        sink.record(item.name());
        if item.name() == "02 - Night Drive.flac" {
            Err(NavError::SkipDir)
        } else {
            Ok(())
        }
    });
    walk(&tree, options);

    assert!(recorder.contains("02 - Night Drive.flac"));
    assert!(!recorder.contains("03 - Tick of the Clock.flac"));
    assert!(!recorder.contains("cover.night-drive.jpg"));
    assert!(recorder.contains("College"));
}

#[test]
fn test_skip_all_ends_walk_without_error() {
    let tree = MusicTree::new();
    let recorder = Recorder::new();
    let sink = recorder.clone();
    let options = TraverseOptions::with_callback(move |item| {
        sink.record(item.name());
        if item.name() == "Northern Council" {
            Err(NavError::SkipAll)
        } else {
            Ok(())
        }
    });
    let (_, result) = walk(&tree, options);

    assert!(result.is_ok());
    assert_eq!(recorder.names().last().map(String::as_str), Some("Northern Council"));
    assert_eq!(recorder.names().len(), 10);
}

#[test]
fn test_callback_error_aborts_with_partial_metrics() {
    let tree = MusicTree::new();
    let options = TraverseOptions::with_callback(|item| {
        if item.name() == "College" {
            Err(NavError::callback("no college allowed"))
        } else {
            Ok(())
        }
    });
    let (_, result) = walk(&tree, options);

    assert_eq!(result.error.unwrap().to_string(), "no college allowed");
    assert_eq!(result.metrics.folders(), 4);
    assert_eq!(result.metrics.files(), 5);
}

fn failing_hooks(fail: &'static str) -> Hooks {
    let mut hooks = Hooks::default();
    let native = Arc::clone(&hooks.read_directory);
    hooks.read_directory = Arc::new(move |path: &Path| {
        if path.ends_with(fail) {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        } else {
            native(path)
        }
    });
    hooks
}

#[test]
fn test_read_error_delivered_after_folder() {
    let tree = MusicTree::new();
    let recorder = Recorder::new();
    let sink = recorder.clone();
    let mut options = TraverseOptions::with_callback(move |item| match &item.error {
        Some(_) => {
            sink.record(format!("error:{}", item.name()));
            Err(NavError::SkipDir)
        }
        None => {
            sink.record(item.name());
            Ok(())
        }
    });
    options.hooks = failing_hooks("College");
    let (_, result) = walk(&tree, options);

    assert!(result.is_ok());
    let names = recorder.names();
    let folder = names.iter().position(|n| n == "College").unwrap();
    assert_eq!(names[folder + 1], "error:College");
    assert_eq!(names[folder + 2], "Electric Youth");
    // The error delivery is not counted.
    assert_eq!(result.metrics.folders(), FOLDERS - 2);
}

#[test]
fn test_skipped_folder_is_never_read() {
    for subscription in [Subscription::Any, Subscription::Folders] {
        let tree = MusicTree::new();
        let reads = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reads);
        let mut hooks = Hooks::default();
        let native = Arc::clone(&hooks.read_directory);
        hooks.read_directory = Arc::new(move |path: &Path| {
            sink.lock().unwrap().push(path.to_path_buf());
            native(path)
        });

        let mut options = TraverseOptions::with_callback(|item| {
            if item.name() == "College" {
                Err(NavError::SkipDir)
            } else {
                Ok(())
            }
        });
        options.store.subscription = subscription;
        options.hooks = hooks;
        let (_, result) = walk(&tree, options);

        assert!(result.is_ok());
        let reads = reads.lock().unwrap();
        assert!(!reads.contains(&tree.path("College")), "{subscription}");
        assert!(reads.contains(&tree.path("Electric Youth")), "{subscription}");
    }
}

#[test]
fn test_skipped_folder_read_error_is_not_delivered() {
    let tree = MusicTree::new();
    let recorder = Recorder::new();
    let sink = recorder.clone();
    let mut options = TraverseOptions::with_callback(move |item| {
        let name = match &item.error {
            Some(_) => format!("error:{}", item.name()),
            None => item.name(),
        };
        sink.record(name);
        if item.name() == "College" {
            Err(NavError::SkipDir)
        } else {
            Ok(())
        }
    });
    options.hooks = failing_hooks("College");
    let (_, result) = walk(&tree, options);

    assert!(result.is_ok());
    assert!(recorder.contains("College"));
    assert!(!recorder.contains("error:College"));
    assert!(recorder.contains("Electric Youth"));
}

#[test]
fn test_unhandled_read_error_aborts() {
    let tree = MusicTree::new();
    let mut options = TraverseOptions::with_callback(|_| Ok(()));
    options.hooks = failing_hooks("Night Drive");
    let (_, result) = walk(&tree, options);

    match result.error {
        Some(NavError::ReadDir { path, text, .. }) => {
            assert!(path.ends_with("Night Drive"));
            assert!(text.starts_with("failed to read directory"));
        }
        other => panic!("expected a read error, got {other:?}"),
    }
    assert_eq!(result.metrics.folders(), 3);
    assert_eq!(result.metrics.files(), 0);
}

#[test]
fn test_missing_root_reports_not_found() {
    let tree = MusicTree::new();
    let recorder = Recorder::new();
    let options = TraverseOptions {
        callback: Some(recorder.callback()),
        ..TraverseOptions::default()
    };
    let missing = tree.path("Vaporwave");
    let mut session = PrimarySession::new(&NavContext::default(), &missing, options).unwrap();
    let result = session.run();

    assert!(matches!(result.error, Some(NavError::NotFound { .. })));
    assert_eq!(recorder.names(), vec!["Vaporwave"]);
}

#[test]
fn test_notifications() {
    let tree = MusicTree::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut notify = Notifications::default();
    let sink = Arc::clone(&events);
    notify.on_begin = Some(Arc::new(move |_: &Path| sink.lock().unwrap().push("begin".to_string())));
    let sink = Arc::clone(&events);
    notify.on_descend = Some(Arc::new(move |item: &TraverseItem| {
        sink.lock().unwrap().push(format!("descend:{}", item.name()))
    }));
    let sink = Arc::clone(&events);
    notify.on_ascend = Some(Arc::new(move |item: &TraverseItem| {
        sink.lock().unwrap().push(format!("ascend:{}", item.name()))
    }));
    let sink = Arc::clone(&events);
    notify.on_end = Some(Arc::new(move |result: &rustwalk::nav::TraverseResult| {
        sink.lock().unwrap().push(format!("end:{}", result.metrics.files()))
    }));

    let mut options = TraverseOptions::default();
    options.notify = notify;
    walk(&tree, options);

    let events = events.lock().unwrap();
    assert_eq!(events.first().map(String::as_str), Some("begin"));
    assert_eq!(events.last().map(String::as_str), Some("end:14"));
    let descends = events.iter().filter(|e| e.starts_with("descend:")).count();
    let ascends = events.iter().filter(|e| e.starts_with("ascend:")).count();
    assert_eq!(descends, FOLDERS as usize);
    assert_eq!(descends, ascends);
}

#[test]
fn test_cancel_stops_walk() {
    let tree = MusicTree::new();
    let cancel = CancelToken::new();
    let trip = cancel.clone();
    let mut options = TraverseOptions::with_callback(move |item| {
        if item.name() == "Night Drive" {
            trip.cancel();
        }
        Ok(())
    });
    options.cancel = cancel;
    let (_, result) = walk(&tree, options);

    assert!(matches!(result.error, Some(NavError::Cancelled)));
    assert_eq!(result.metrics.folders(), 3);
    assert_eq!(result.metrics.files(), 0);
}
