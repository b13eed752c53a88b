//! Navigator delivering files only.

use std::sync::Arc;

use crate::error::NavError;
use crate::nav::agent::Agent;
use crate::nav::frame::NavigationFrame;
use crate::nav::item::TraverseItem;
use crate::nav::navigator::{deliver_read_error, descend, walk_children, Navigator};
use crate::nav::options::Subscription;

pub(crate) struct FilesNavigator {
    agent: Agent,
}

impl FilesNavigator {
    pub(crate) fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Navigator for FilesNavigator {
    fn subscription(&self) -> Subscription {
        Subscription::Files
    }

    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn traverse(&self, frame: &mut NavigationFrame, mut item: TraverseItem) -> Result<(), NavError> {
        frame.observe(&item)?;
        if item.error.is_some() {
            return frame.proxy_error(&Arc::new(item));
        }

        if !item.is_dir() {
            self.agent.extend_file(frame, &mut item);
            return frame.proxy(&Arc::new(item));
        }

        // Folders are recursed into but never delivered.
        let opened = self.agent.open(frame, &mut item);
        let item = Arc::new(item);
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
