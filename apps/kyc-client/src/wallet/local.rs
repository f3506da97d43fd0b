// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process wallet holding private keys directly.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, RwLock,
};

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};
use url::Url;

use super::{signing, WalletError, WalletEvent, WalletProvider};
use crate::blockchain::{AlloyKycContract, KycContract, RawError};
use crate::config::{NetworkConfig, WalletKeySource};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A [`WalletProvider`] backed by local signers talking to an HTTP RPC.
///
/// The first signer is the active account. Account selection, revocation
/// and chain switches are broadcast the same way a browser wallet would
/// report them.
pub struct LocalWallet {
    rpc_url: Url,
    chain_id: AtomicU64,
    signers: RwLock<Vec<PrivateKeySigner>>,
    revoked: AtomicBool,
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWallet {
    /// Wallet over `signers`; the first one is the active account.
    pub fn new(network: NetworkConfig, signers: Vec<PrivateKeySigner>) -> Result<Self, WalletError> {
        if signers.is_empty() {
            return Err(WalletError::NoKeys);
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            rpc_url: network.rpc_url,
            chain_id: AtomicU64::new(network.chain_id),
            signers: RwLock::new(signers),
            revoked: AtomicBool::new(false),
            events,
        })
    }

    /// Build a wallet from configured key material.
    pub fn from_key_source(
        network: NetworkConfig,
        source: &WalletKeySource,
    ) -> Result<Self, WalletError> {
        let signers = match source {
            WalletKeySource::Hex(keys) => keys
                .iter()
                .map(|key| signing::signer_from_hex(key))
                .collect::<Result<Vec<_>, _>>()?,
            WalletKeySource::PemFile(path) => vec![signing::signer_from_pem_file(path)?],
        };

        Self::new(network, signers)
    }

    /// Chain id transactions are signed for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id.load(Ordering::SeqCst)
    }

    /// All managed accounts, active first.
    pub fn accounts(&self) -> Vec<Address> {
        self.read_signers().iter().map(|s| s.address()).collect()
    }

    /// Make `account` the active one and announce it.
    pub fn select_account(&self, account: Address) -> Result<(), WalletError> {
        let accounts = {
            let mut signers = self
                .signers
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let index = signers
                .iter()
                .position(|s| s.address() == account)
                .ok_or(WalletError::UnknownAccount(account))?;
            let signer = signers.remove(index);
            signers.insert(0, signer);
            signers.iter().map(|s| s.address()).collect::<Vec<_>>()
        };

        self.revoked.store(false, Ordering::SeqCst);
        info!(account = %account, "Active wallet account changed");
        self.emit(WalletEvent::AccountsChanged(accounts));
        Ok(())
    }

    /// Withdraw authorization. Later `request_accounts` calls are declined
    /// until an account is selected again.
    pub fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
        info!("Wallet authorization revoked");
        self.emit(WalletEvent::AccountsChanged(Vec::new()));
    }

    /// Move to another chain and announce it.
    pub fn switch_chain(&self, chain_id: u64) {
        let previous = self.chain_id.swap(chain_id, Ordering::SeqCst);
        info!(from = previous, to = chain_id, "Wallet chain switched");
        self.emit(WalletEvent::ChainChanged(chain_id));
    }

    fn emit(&self, event: WalletEvent) {
        // No receivers is fine, nobody is connected.
        if self.events.send(event).is_err() {
            debug!("No wallet event subscribers");
        }
    }

    fn read_signers(&self) -> std::sync::RwLockReadGuard<'_, Vec<PrivateKeySigner>> {
        self.signers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, RawError> {
        if self.revoked.load(Ordering::SeqCst) {
            return Err(RawError::rejected("User rejected the request."));
        }
        Ok(self.accounts())
    }

    async fn bind_contract(
        &self,
        account: Address,
        contract: Address,
    ) -> Result<Arc<dyn KycContract>, RawError> {
        let signer = self
            .read_signers()
            .iter()
            .find(|s| s.address() == account)
            .cloned()
            .ok_or_else(|| RawError::other(WalletError::UnknownAccount(account).to_string()))?
            .with_chain_id(Some(self.chain_id()));

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.rpc_url.clone())
            .erased();

        debug!(
            account = %account,
            contract = %contract,
            rpc_url = %self.rpc_url,
            "Bound contract to signer"
        );

        Ok(Arc::new(AlloyKycContract::new(contract, provider)))
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
