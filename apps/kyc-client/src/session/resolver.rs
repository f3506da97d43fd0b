// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role resolution for the connected account and for arbitrary addresses.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{debug, warn};
use uuid::Uuid;

use super::KycSession;
use crate::blockchain::{KycContract, RawError, UserDetails, ROLE_BANK_EMPLOYEE};
use crate::error::KycError;
use crate::roles::UserRole;

/// Look up `account`'s role. An account the contract has never seen comes
/// back as no data, which means unregistered.
pub(super) async fn resolve_role(
    contract: &Arc<dyn KycContract>,
    account: Address,
) -> Result<UserRole, RawError> {
    let code = match contract.user_role(account).await {
        Ok(code) => code,
        Err(raw) if raw.is_no_data() => {
            debug!(account = %account, "No role data, treating as unregistered");
            return Ok(UserRole::Unregistered);
        }
        Err(raw) => return Err(raw),
    };

    let ifsc = if code == ROLE_BANK_EMPLOYEE {
        match contract.user_details(account).await {
            Ok(details) => details.ifsc_code,
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to read employee IFSC");
                String::new()
            }
        }
    } else {
        String::new()
    };

    Ok(UserRole::from_code(code, ifsc))
}

impl KycSession {
    /// Re-read the connected account's role.
    ///
    /// Without a connection the role is cleared and `Unregistered` returned.
    /// A failed lookup is recorded in `last_error`, resets the role and is
    /// returned.
    pub async fn fetch_role(&self) -> Result<UserRole, KycError> {
        let _guard = self.begin()?;
        self.refresh_role(Uuid::new_v4()).await
    }

    /// Role of any address, leaving the session untouched.
    pub async fn role_of(&self, account: Address) -> Result<UserRole, KycError> {
        let (_, contract) = self.require_binding()?;
        resolve_role(&contract, account)
            .await
            .map_err(|raw| KycError::from_raw(&raw))
    }

    /// Raw user record of any address, leaving the session untouched.
    pub async fn user_details(&self, account: Address) -> Result<UserDetails, KycError> {
        let (_, contract) = self.require_binding()?;
        contract
            .user_details(account)
            .await
            .map_err(|raw| KycError::from_raw(&raw))
    }

    /// Caller must hold the in-flight guard.
    pub(super) async fn refresh_role(&self, operation_id: Uuid) -> Result<UserRole, KycError> {
        let (generation, binding) = {
            let state = self.state.borrow();
            (state.generation, state.binding())
        };

        let Some((account, contract)) = binding else {
            self.state
                .send_if_modified(|s| std::mem::take(&mut s.user_role).is_registered());
            return Ok(UserRole::Unregistered);
        };

        self.commit(generation, |s| s.is_loading = true);

        match resolve_role(&contract, account).await {
            Ok(role) => {
                debug!(
                    operation_id = %operation_id,
                    account = %account,
                    role = %role,
                    "Resolved role"
                );
                let resolved = role.clone();
                self.commit(generation, |s| {
                    s.user_role = resolved;
                    s.is_loading = false;
                });
                Ok(role)
            }
            Err(raw) => {
                let err = KycError::from_raw(&raw);
                warn!(
                    operation_id = %operation_id,
                    account = %account,
                    error = %raw,
                    "Role lookup failed"
                );
                let message = err.to_string();
                self.commit(generation, |s| {
                    s.user_role = UserRole::Unregistered;
                    s.last_error = Some(message);
                    s.is_loading = false;
                });
                Err(err)
            }
        }
    }

    pub(super) fn require_binding(&self) -> Result<(Address, Arc<dyn KycContract>), KycError> {
        self.state.borrow().binding().ok_or(KycError::NotConnected)
    }
}
