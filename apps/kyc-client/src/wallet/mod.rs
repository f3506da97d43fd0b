// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet provider boundary.
//!
//! A wallet provider authorizes accounts, hands out contract handles bound
//! to an account's signer, and reports account and network changes.

pub mod local;
pub mod signing;

use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::blockchain::{KycContract, RawError};

pub use local::LocalWallet;

/// Change reported by the wallet outside of any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The authorized account list changed. Empty means access was revoked.
    AccountsChanged(Vec<Address>),
    /// The wallet moved to another chain.
    ChainChanged(u64),
}

/// Local wallet setup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Failed to read key file: {0}")]
    KeyFile(String),

    #[error("No private keys configured")]
    NoKeys,

    #[error("Account {0} is not managed by this wallet")]
    UnknownAccount(Address),
}

/// An external signer holding the user's accounts.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the holder to authorize access. The first account is the active
    /// one. A declined request is an `ActionRejected` error.
    async fn request_accounts(&self) -> Result<Vec<Address>, RawError>;

    /// Contract handle whose writes are signed by `account`.
    async fn bind_contract(
        &self,
        account: Address,
        contract: Address,
    ) -> Result<Arc<dyn KycContract>, RawError>;

    /// Stream of account and chain changes.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}
