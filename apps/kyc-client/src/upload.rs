// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Documents waiting to be pinned and referenced on-chain.

use std::time::Duration;

use tokio::{sync::watch, time::Instant};
use tracing::{info, warn};

use crate::error::KycError;
use crate::providers::{PinningError, PinningService};

/// Progress is simulated: the pinning API reports nothing until it is done.
pub const PROGRESS_TICK: Duration = Duration::from_millis(500);
pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_CAP: u8 = 90;
pub const PROGRESS_DONE: u8 = 100;

/// A picked file and, once pinned, its content hash.
pub struct PendingUpload {
    file_name: String,
    bytes: Vec<u8>,
    content_hash: Option<String>,
    progress: watch::Sender<u8>,
}

impl PendingUpload {
    /// A file selected for upload, not yet pinned.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            file_name: file_name.into(),
            bytes,
            content_hash: None,
            progress,
        }
    }

    /// Original file name, sent along to the pinning service.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Content hash, once the upload has completed.
    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    /// Current progress, 0 to 100.
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    /// Receiver for progress updates.
    pub fn watch_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Pin the file unless it already has a hash, and return the hash.
    ///
    /// On failure progress drops back to 0 and no hash is kept, so the same
    /// upload can be retried.
    pub async fn upload(&mut self, pinning: &dyn PinningService) -> Result<String, PinningError> {
        if let Some(hash) = &self.content_hash {
            return Ok(hash.clone());
        }

        self.progress.send_replace(0);

        let pin = pinning.pin_file(&self.file_name, self.bytes.clone());
        tokio::pin!(pin);

        let mut ticker = tokio::time::interval_at(Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
        let result = loop {
            tokio::select! {
                biased;
                result = &mut pin => break result,
                _ = ticker.tick() => {
                    self.progress.send_modify(|p| *p = p.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP));
                }
            }
        };

        match result {
            Ok(hash) => {
                info!(file_name = %self.file_name, content_hash = %hash, "Document uploaded");
                self.progress.send_replace(PROGRESS_DONE);
                self.content_hash = Some(hash.clone());
                Ok(hash)
            }
            Err(e) => {
                warn!(file_name = %self.file_name, error = %e, "Document upload failed");
                self.progress.send_replace(0);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .field("content_hash", &self.content_hash)
            .field("progress", &self.progress())
            .finish()
    }
}

/// A failed submission, with the upload handed back so it can be retried.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct SubmitError {
    pub error: KycError,
    pub upload: PendingUpload,
}
