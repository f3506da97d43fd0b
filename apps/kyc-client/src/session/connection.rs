// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet connection lifecycle.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, warn};
use uuid::Uuid;

use super::{state::ContractHandle, subscription::WalletSubscription, KycSession, SessionState};
use crate::blockchain::RawErrorKind;
use crate::error::KycError;
use crate::roles::UserRole;
use crate::wallet::WalletProvider;

impl KycSession {
    /// Connect to the wallet's active account and resolve its role.
    ///
    /// Registers the wallet event subscription on first success. A failed
    /// role lookup does not fail the connection; it is left in `last_error`.
    /// A `disconnect` while this runs makes it fail with
    /// [`KycError::NotConnected`] and leaves no subscription behind.
    pub async fn connect(self: &Arc<Self>) -> Result<Address, KycError> {
        let _guard = self.begin()?;
        let operation_id = Uuid::new_v4();
        let (wallet, account, generation) = self.connect_locked(operation_id).await?;
        if !self.ensure_subscription(generation, wallet.as_ref()) {
            warn!(operation_id = %operation_id, "Session reset before subscribing");
            return Err(KycError::NotConnected);
        }
        Ok(account)
    }

    /// Drop the subscription and clear the session. Never fails.
    pub fn disconnect(&self) {
        self.reset(false);
        info!(contract = %self.contract_address, "Wallet session disconnected");
    }

    pub(super) fn reset(&self, reload_required: bool) {
        // Held across the generation bump; `ensure_subscription` checks the
        // generation under the same lock.
        let mut slot = self.subscription_slot();
        let subscription = slot.take();
        self.state.send_modify(|s| *s = s.reset(reload_required));
        drop(slot);
        // Cancels the event task.
        drop(subscription);
    }

    /// Caller must hold the in-flight guard. Returns the generation the
    /// connection was made in.
    pub(super) async fn connect_locked(
        &self,
        operation_id: Uuid,
    ) -> Result<(Arc<dyn WalletProvider>, Address, u64), KycError> {
        let generation = self.generation();

        let Some(wallet) = self.wallet.clone() else {
            return Err(self.fail_connect(generation, KycError::ProviderUnavailable));
        };

        self.commit(generation, |s| {
            s.is_loading = true;
            s.last_error = None;
        });

        let account = match wallet.request_accounts().await {
            Ok(accounts) => accounts.first().copied(),
            Err(raw) if raw.kind == RawErrorKind::ActionRejected => None,
            Err(raw) => return Err(self.fail_connect(generation, KycError::from_raw(&raw))),
        };
        let Some(account) = account else {
            return Err(self.fail_connect(generation, KycError::AuthorizationDenied));
        };

        let contract = match wallet.bind_contract(account, self.contract_address).await {
            Ok(contract) => contract,
            Err(raw) => return Err(self.fail_connect(generation, KycError::from_raw(&raw))),
        };

        let bound = self.commit(generation, |s| {
            s.account = Some(account);
            s.contract = Some(ContractHandle(contract));
            s.user_role = UserRole::Unregistered;
            s.current_kyc = None;
            s.ifsc_employees.clear();
            s.reload_required = false;
        });
        if !bound {
            warn!(operation_id = %operation_id, "Session reset while connecting");
            return Err(KycError::NotConnected);
        }

        info!(
            operation_id = %operation_id,
            account = %account,
            contract = %self.contract_address,
            "Wallet connected"
        );

        if let Err(e) = self.refresh_role(operation_id).await {
            warn!(operation_id = %operation_id, error = %e, "Role resolution failed after connect");
        }
        if !self.commit(generation, |s| s.is_loading = false) {
            warn!(operation_id = %operation_id, "Session reset while resolving role");
            return Err(KycError::NotConnected);
        }

        Ok((wallet, account, generation))
    }

    /// Back to the disconnected baseline with `err` recorded.
    fn fail_connect(&self, generation: u64, err: KycError) -> KycError {
        warn!(error = %err, code = err.error_code(), "Wallet connection failed");
        let message = err.to_string();
        self.commit(generation, |s| {
            *s = SessionState {
                last_error: Some(message),
                reload_required: s.reload_required,
                generation: s.generation,
                ..SessionState::default()
            };
        });
        err
    }

    /// Start the event subscription unless the session moved past
    /// `generation`. Returns whether the session is still current.
    fn ensure_subscription(
        self: &Arc<Self>,
        generation: u64,
        wallet: &dyn WalletProvider,
    ) -> bool {
        let mut slot = self.subscription_slot();
        if self.generation() != generation {
            return false;
        }
        if slot.is_none() {
            *slot = Some(WalletSubscription::spawn(
                Arc::downgrade(self),
                wallet.subscribe(),
            ));
        }
        true
    }
}
