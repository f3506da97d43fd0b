// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Observable session state.

use std::sync::Arc;

use alloy::primitives::Address;
use serde::Serialize;

use crate::blockchain::{KycContract, KycRecord};
use crate::roles::UserRole;

/// Signer-bound contract handle held by a connected session.
#[derive(Clone)]
pub struct ContractHandle(pub(crate) Arc<dyn KycContract>);

impl ContractHandle {
    /// The bound contract.
    pub fn contract(&self) -> &Arc<dyn KycContract> {
        &self.0
    }
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContractHandle")
            .field(&self.0.address())
            .finish()
    }
}

/// Everything a view renders from.
///
/// Capability flags are derived from `user_role` rather than stored, so they
/// can never disagree with it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub account: Option<Address>,
    pub contract: Option<ContractHandle>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub user_role: UserRole,
    /// Single slot: replaced by every record query.
    pub current_kyc: Option<KycRecord>,
    pub ifsc_employees: Vec<Address>,
    /// The wallet changed networks; views should reload.
    pub reload_required: bool,
    /// Bumped on every reset so in-flight work can tell it was superseded.
    pub(crate) generation: u64,
}

impl SessionState {
    /// Both an account and a contract handle are present.
    pub fn is_connected(&self) -> bool {
        self.account.is_some() && self.contract.is_some()
    }

    /// Connected as Admin.
    pub fn is_admin(&self) -> bool {
        self.is_connected() && self.user_role.is_admin()
    }

    /// Connected as a bank employee.
    pub fn is_bank_employee(&self) -> bool {
        self.is_connected() && self.user_role.is_bank_employee()
    }

    /// Connected as Customer.
    pub fn is_customer(&self) -> bool {
        self.is_connected() && self.user_role.is_customer()
    }

    /// IFSC code of a connected bank employee.
    pub fn user_ifsc(&self) -> Option<&str> {
        self.user_role.ifsc()
    }

    /// Account and contract when connected.
    pub(crate) fn binding(&self) -> Option<(Address, Arc<dyn KycContract>)> {
        match (&self.account, &self.contract) {
            (Some(account), Some(handle)) => Some((*account, handle.0.clone())),
            _ => None,
        }
    }

    /// Empty state for a new generation.
    pub(crate) fn reset(&self, reload_required: bool) -> Self {
        Self {
            reload_required,
            generation: self.generation + 1,
            ..Self::default()
        }
    }

    /// Serializable projection with the derived flags filled in.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            account: self.account,
            is_connected: self.is_connected(),
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            user_role: self.user_role.clone(),
            is_admin: self.is_admin(),
            is_bank_employee: self.is_bank_employee(),
            is_customer: self.is_customer(),
            user_ifsc: self.user_ifsc().map(str::to_string),
            current_kyc: self.current_kyc.clone(),
            ifsc_employees: self.ifsc_employees.clone(),
            reload_required: self.reload_required,
        }
    }
}

/// Serializable view of [`SessionState`] with the derived flags filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub account: Option<Address>,
    pub is_connected: bool,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub user_role: UserRole,
    pub is_admin: bool,
    pub is_bank_employee: bool,
    pub is_customer: bool,
    pub user_ifsc: Option<String>,
    pub current_kyc: Option<KycRecord>,
    pub ifsc_employees: Vec<Address>,
    pub reload_required: bool,
}
