// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External document pinning.
//!
//! KYC documents never go on-chain. They are pinned to IPFS and only the
//! resulting content hash is submitted to the contract.

pub mod pinata;

use async_trait::async_trait;

pub use pinata::PinataClient;

/// Pinning failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PinningError {
    #[error("Pinning configuration missing: {0}")]
    MissingConfig(String),

    #[error("Failed to upload file to IPFS: {0}")]
    Request(String),

    #[error("Pinning response was invalid: {0}")]
    InvalidResponse(String),
}

/// A content-addressed document store.
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Upload `bytes` and return their content hash.
    async fn pin_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, PinningError>;

    /// Retrievable URL for a content hash.
    fn gateway_url(&self, content_hash: &str) -> String;
}
