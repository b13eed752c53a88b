//! Navigator delivering folders, optionally carrying their files.

use std::sync::Arc;

use crate::error::NavError;
use crate::nav::agent::Agent;
use crate::nav::frame::NavigationFrame;
use crate::nav::item::TraverseItem;
use crate::nav::navigator::{deliver_read_error, descend, walk_children, Navigator};
use crate::nav::options::Subscription;

pub(crate) struct FoldersNavigator {
    agent: Agent,
    with_files: bool,
}

impl FoldersNavigator {
    pub(crate) fn new(agent: Agent, with_files: bool) -> Self {
        Self { agent, with_files }
    }
}

impl Navigator for FoldersNavigator {
    fn subscription(&self) -> Subscription {
        if self.with_files {
            Subscription::FoldersWithFiles
        } else {
            Subscription::Folders
        }
    }

    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn traverse(&self, frame: &mut NavigationFrame, mut item: TraverseItem) -> Result<(), NavError> {
        // Files are never visited; a root that is a file yields nothing.
        if !item.is_dir() && item.error.is_none() {
            return Ok(());
        }
        frame.observe(&item)?;
        if item.error.is_some() {
            return frame.proxy_error(&Arc::new(item));
        }

        let opened = self.agent.open(frame, &mut item);
        let item = Arc::new(item);
        // Attached files must be in place before the folder is delivered.
        let opened = if self.with_files {
            let mut contents = self.agent.contents(&item, opened);
            if let Ok(contents) = contents.as_mut() {
                let files = std::mem::take(&mut contents.files);
                self.agent.attach_files(frame, &item, files);
            }
            Some(contents)
        } else {
            opened
        };

        match frame.proxy(&item) {
            Ok(()) => {}
            Err(NavError::SkipDir) => return Ok(()),
            Err(e) => return Err(e),
        }

        let contents = match self.agent.contents(&item, opened) {
            Ok(contents) => contents,
            Err(e) => return deliver_read_error(frame, &item, e),
        };
        descend(frame, &item, |frame| {
            let children = self.agent.children(frame, &item, contents);
            walk_children(self, frame, children)
        })
    }
}
