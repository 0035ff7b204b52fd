//! Shared stub collaborators for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use wikivault::assets::DownloadQueue;
use wikivault::net::{NetError, RedirectLookup};

/// Records every scheduled download instead of performing it.
#[derive(Default)]
pub struct RecordingQueue {
    pub scheduled: Mutex<Vec<(String, PathBuf)>>,
}

impl DownloadQueue for RecordingQueue {
    fn enqueue(&self, source_url: String, dest: PathBuf) {
        self.scheduled.lock().unwrap().push((source_url, dest));
    }
}

/// Resolves share links from a fixed map; anything else errors.
#[derive(Default)]
pub struct StaticRedirects {
    pub targets: HashMap<String, String>,
}

impl StaticRedirects {
    pub fn with(mut self, from: &str, to: &str) -> Self {
        self.targets.insert(from.to_string(), to.to_string());
        self
    }
}

#[async_trait]
impl RedirectLookup for StaticRedirects {
    async fn resolve(&self, url: &str) -> Result<String, NetError> {
        self.targets.get(url).cloned().ok_or_else(|| NetError::Io {
            path: PathBuf::from(url),
            source: std::io::Error::other("no stubbed redirect target"),
        })
    }
}
