// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Store
//!
//! [`KycSession`] owns the wallet connection, the signer-bound contract
//! handle and everything derived from them. Views read it through a
//! [`watch`] channel and drive it through async operations.
//!
//! ## Concurrency
//!
//! One operation runs at a time. User-triggered operations that find
//! another one in flight fail with [`KycError::Busy`]. Wallet events wait
//! for the running operation to finish instead.
//!
//! `disconnect` never waits: it resets the state to a new generation, and
//! any operation still in flight discards its result when it finishes.

mod connection;
mod queries;
mod resolver;
mod state;
mod subscription;
mod transactions;

use std::sync::{Arc, Mutex as StdMutex};

use alloy::primitives::Address;
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::error::KycError;
use crate::providers::PinningService;
use crate::wallet::WalletProvider;

pub use state::{ContractHandle, SessionSnapshot, SessionState};
use subscription::WalletSubscription;

/// Wallet session and KYC contract client.
///
/// Shared behind an [`Arc`]; `connect` needs the `Arc` to register the
/// wallet event subscription.
pub struct KycSession {
    contract_address: Address,
    wallet: Option<Arc<dyn WalletProvider>>,
    pinning: Option<Arc<dyn PinningService>>,
    state: watch::Sender<SessionState>,
    in_flight: Mutex<()>,
    subscription: StdMutex<Option<WalletSubscription>>,
}

impl KycSession {
    /// Create an empty, disconnected session.
    ///
    /// Without a wallet provider every `connect` fails with
    /// [`KycError::ProviderUnavailable`].
    pub fn new(contract_address: Address, wallet: Option<Arc<dyn WalletProvider>>) -> Self {
        let (state, _) = watch::channel(SessionState::default());

        Self {
            contract_address,
            wallet,
            pinning: None,
            state,
            in_flight: Mutex::new(()),
            subscription: StdMutex::new(None),
        }
    }

    /// Enable document uploads.
    pub fn with_pinning(mut self, pinning: Arc<dyn PinningService>) -> Self {
        self.pinning = Some(pinning);
        self
    }

    /// Address of the KYC contract this session talks to.
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Serializable view of the current state with derived flags.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().snapshot()
    }

    /// Dismiss `last_error`. Notifies only if one was set.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.last_error.take().is_some());
    }

    /// Gateway link for a document hash, when pinning is configured.
    pub fn document_url(&self, content_hash: &str) -> Option<String> {
        self.pinning
            .as_ref()
            .map(|pinning| pinning.gateway_url(content_hash))
    }

    /// Whether a wallet event subscription is live.
    pub fn is_subscribed(&self) -> bool {
        self.subscription_slot().is_some()
    }

    fn begin(&self) -> Result<MutexGuard<'_, ()>, KycError> {
        self.in_flight.try_lock().map_err(|_| KycError::Busy)
    }

    fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Apply `update` unless the session was reset since `generation`.
    fn commit<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            update(s);
            true
        })
    }

    /// Record a failure without touching anything else.
    fn record_error(&self, generation: u64, err: &KycError) {
        let message = err.to_string();
        self.commit(generation, |s| {
            s.is_loading = false;
            s.last_error = Some(message);
        });
    }

    fn subscription_slot(&self) -> std::sync::MutexGuard<'_, Option<WalletSubscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for KycSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KycSession")
            .field("contract_address", &self.contract_address)
            .field("has_wallet", &self.wallet.is_some())
            .field("has_pinning", &self.pinning.is_some())
            .field("state", &*self.state.borrow())
            .finish()
    }
}
