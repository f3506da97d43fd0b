// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted doubles for the contract, wallet and pinning boundaries.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use alloy::primitives::{address, Address, TxHash};
use async_trait::async_trait;
use tokio::sync::{broadcast, Notify};

use crate::blockchain::{
    KycCall, KycContract, RawError, RawKycDetails, TxOutcome, UserDetails,
};
use crate::providers::{PinningError, PinningService};
use crate::wallet::{WalletEvent, WalletProvider};

pub const ALICE: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const BOB: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
pub const CAROL: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
pub const CONTRACT: Address = address!("2f243960a2af242271f75b43af37df36b8f3cdbc");

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn outcome() -> TxOutcome {
    TxOutcome {
        tx_hash: TxHash::repeat_byte(0x11),
        block_number: Some(7),
        gas_used: 21_000,
    }
}

/// Contract double. Unscripted role lookups answer with no data, as the
/// real contract does for accounts it has never seen.
pub struct MockContract {
    roles: Mutex<HashMap<Address, Result<u8, RawError>>>,
    details: Mutex<HashMap<Address, Result<UserDetails, RawError>>>,
    kyc: Mutex<HashMap<Address, Result<RawKycDetails, RawError>>>,
    employees: Mutex<HashMap<String, Result<Vec<Address>, RawError>>>,
    send_result: Mutex<Result<TxOutcome, RawError>>,
    sent: Mutex<Vec<KycCall>>,
    send_gate: Mutex<Option<Arc<Notify>>>,
    role_gate: Mutex<Option<Arc<Notify>>>,
    role_lookups: AtomicUsize,
}

impl MockContract {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            roles: Mutex::new(HashMap::new()),
            details: Mutex::new(HashMap::new()),
            kyc: Mutex::new(HashMap::new()),
            employees: Mutex::new(HashMap::new()),
            send_result: Mutex::new(Ok(outcome())),
            sent: Mutex::new(Vec::new()),
            send_gate: Mutex::new(None),
            role_gate: Mutex::new(None),
            role_lookups: AtomicUsize::new(0),
        })
    }

    pub fn set_role(&self, account: Address, code: u8) {
        lock(&self.roles).insert(account, Ok(code));
    }

    pub fn fail_role(&self, account: Address, err: RawError) {
        lock(&self.roles).insert(account, Err(err));
    }

    pub fn set_details(&self, account: Address, result: Result<UserDetails, RawError>) {
        lock(&self.details).insert(account, result);
    }

    pub fn set_kyc(&self, applicant: Address, result: Result<RawKycDetails, RawError>) {
        lock(&self.kyc).insert(applicant, result);
    }

    pub fn set_employees(&self, ifsc: &str, result: Result<Vec<Address>, RawError>) {
        lock(&self.employees).insert(ifsc.to_string(), result);
    }

    pub fn set_send_result(&self, result: Result<TxOutcome, RawError>) {
        *lock(&self.send_result) = result;
    }

    /// Hold every `send` until the returned gate is notified.
    pub fn hold_sends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.send_gate) = Some(gate.clone());
        gate
    }

    /// Hold every role lookup until the returned gate is notified.
    pub fn hold_role_lookups(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.role_gate) = Some(gate.clone());
        gate
    }

    pub fn sent(&self) -> Vec<KycCall> {
        lock(&self.sent).clone()
    }

    pub fn role_lookups(&self) -> usize {
        self.role_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KycContract for MockContract {
    fn address(&self) -> Address {
        CONTRACT
    }

    async fn user_role(&self, account: Address) -> Result<u8, RawError> {
        self.role_lookups.fetch_add(1, Ordering::SeqCst);
        let gate = lock(&self.role_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.roles)
            .get(&account)
            .cloned()
            .unwrap_or_else(|| Err(RawError::no_data("getUserRole", "returned no data (\"0x\")")))
    }

    async fn user_details(&self, account: Address) -> Result<UserDetails, RawError> {
        lock(&self.details)
            .get(&account)
            .cloned()
            .unwrap_or_else(|| Err(RawError::no_data("getUserDetails", "returned no data")))
    }

    async fn kyc_details(&self, applicant: Address) -> Result<RawKycDetails, RawError> {
        lock(&self.kyc)
            .get(&applicant)
            .cloned()
            .unwrap_or_else(|| {
                Err(RawError::revert("KYC: No application found", "execution reverted"))
            })
    }

    async fn ifsc_employees(&self, ifsc: &str) -> Result<Vec<Address>, RawError> {
        lock(&self.employees)
            .get(ifsc)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send(&self, call: &KycCall) -> Result<TxOutcome, RawError> {
        lock(&self.sent).push(call.clone());
        let gate = lock(&self.send_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.send_result).clone()
    }
}

/// Wallet double handing out one shared [`MockContract`].
pub struct MockWallet {
    accounts: Mutex<Result<Vec<Address>, RawError>>,
    contract: Arc<MockContract>,
    events: broadcast::Sender<WalletEvent>,
    bound: Mutex<Vec<Address>>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>, contract: Arc<MockContract>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(Ok(accounts)),
            contract,
            events,
            bound: Mutex::new(Vec::new()),
        })
    }

    pub fn set_accounts(&self, result: Result<Vec<Address>, RawError>) {
        *lock(&self.accounts) = result;
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    /// Accounts a contract handle was bound for, in order.
    pub fn bound(&self) -> Vec<Address> {
        lock(&self.bound).clone()
    }

    pub fn receiver_count(&self) -> usize {
        self.events.receiver_count()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, RawError> {
        lock(&self.accounts).clone()
    }

    async fn bind_contract(
        &self,
        account: Address,
        _contract: Address,
    ) -> Result<Arc<dyn KycContract>, RawError> {
        lock(&self.bound).push(account);
        Ok(self.contract.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

/// Pinning double.
pub struct MockPinning {
    result: Result<String, PinningError>,
    gate: Option<Arc<Notify>>,
    pins: AtomicUsize,
}

impl MockPinning {
    pub fn succeeding(hash: &str) -> Self {
        Self {
            result: Ok(hash.to_string()),
            gate: None,
            pins: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: PinningError) -> Self {
        Self {
            result: Err(err),
            gate: None,
            pins: AtomicUsize::new(0),
        }
    }

    /// Succeeds only after [`MockPinning::gate`] is notified.
    pub fn gated(hash: &str) -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::succeeding(hash)
        }
    }

    pub fn gate(&self) -> Arc<Notify> {
        self.gate.clone().expect("pinning double was not built with a gate")
    }

    pub fn pin_count(&self) -> usize {
        self.pins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PinningService for MockPinning {
    async fn pin_file(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<String, PinningError> {
        self.pins.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result.clone()
    }

    fn gateway_url(&self, content_hash: &str) -> String {
        format!("https://gateway.test/ipfs/{content_hash}")
    }
}
