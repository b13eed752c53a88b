//! Shared test tree: a small music library.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rustwalk::nav::{Callback, TraverseItem};
use tempfile::TempDir;

pub const ROOT: &str = "RETRO-WAVE";

const TREE: &[(&str, &[&str])] = &[
    (
        "Chromatics/Night Drive",
        &[
            "01 - The Telephone Call.flac",
            "02 - Night Drive.flac",
            "03 - Tick of the Clock.flac",
            "04 - Lady.flac",
            "cover.night-drive.jpg",
        ],
    ),
    (
        "College/Northern Council",
        &[
            "01 - Northern Council.flac",
            "02 - The Energy.flac",
            "cover.northern-council.jpg",
        ],
    ),
    (
        "College/Teenage Color",
        &["01 - Teenage Color.flac", "02 - Kind of Life.flac"],
    ),
    (
        "Electric Youth/Innerworld",
        &[
            "01 - Runaway.flac",
            "02 - Innocence.flac",
            "03 - Modern Wildlife.flac",
            "cover.innerworld.jpg",
        ],
    ),
];

/// Number of folders in the tree, root included.
pub const FOLDERS: u64 = 8;
/// Number of files in the tree.
pub const FILES: u64 = 14;

/// A temporary music library. The walk root is `root()`.
pub struct MusicTree {
    _dir: TempDir,
    root: PathBuf,
}

impl MusicTree {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(ROOT);
        for (folder, files) in TREE {
            let folder = root.join(folder);
            fs::create_dir_all(&folder).unwrap();
            for file in *files {
                fs::write(folder.join(file), file.as_bytes()).unwrap();
            }
        }
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

/// Names passed to a callback, in invocation order.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: String) {
        self.seen.lock().unwrap().push(name);
    }

    /// Callback recording every item's name.
    pub fn callback(&self) -> Callback {
        let recorder = self.clone();
        Arc::new(move |item: &TraverseItem| {
            recorder.record(item.name());
            Ok(())
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.lock().unwrap().iter().any(|n| n == name)
    }
}

/// Every node of the tree in walk order (folders first).
pub fn full_walk() -> Vec<&'static str> {
    vec![
        ROOT,
        "Chromatics",
        "Night Drive",
        "01 - The Telephone Call.flac",
        "02 - Night Drive.flac",
        "03 - Tick of the Clock.flac",
        "04 - Lady.flac",
        "cover.night-drive.jpg",
        "College",
        "Northern Council",
        "01 - Northern Council.flac",
        "02 - The Energy.flac",
        "cover.northern-council.jpg",
        "Teenage Color",
        "01 - Teenage Color.flac",
        "02 - Kind of Life.flac",
        "Electric Youth",
        "Innerworld",
        "01 - Runaway.flac",
        "02 - Innocence.flac",
        "03 - Modern Wildlife.flac",
        "cover.innerworld.jpg",
    ]
}
