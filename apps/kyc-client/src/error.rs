// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session-level error taxonomy.

use crate::blockchain::{RawError, RawErrorKind};
use crate::normalize::{normalize_with_category, RevertCategory};
use crate::providers::PinningError;

/// Errors surfaced by [`KycSession`](crate::session::KycSession) operations.
///
/// `Display` is the normalized, user-facing message; it is also what ends
/// up in the session's `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KycError {
    #[error("No wallet provider found.")]
    ProviderUnavailable,

    #[error("No accounts found or permission denied.")]
    AuthorizationDenied,

    #[error("Not connected.")]
    NotConnected,

    #[error("Another operation is already in progress.")]
    Busy,

    #[error("Transaction rejected by user.")]
    UserRejected,

    #[error("{message}")]
    ContractRevert {
        category: Option<RevertCategory>,
        message: String,
    },

    #[error("{0}")]
    NetworkFailure(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Upload(#[from] PinningError),
}

impl KycError {
    /// Classify and normalize a boundary failure.
    pub fn from_raw(raw: &RawError) -> Self {
        let (category, message) = normalize_with_category(raw);

        match raw.kind {
            RawErrorKind::ActionRejected => KycError::UserRejected,
            RawErrorKind::Network => KycError::NetworkFailure(message),
            RawErrorKind::NoData | RawErrorKind::Revert | RawErrorKind::Other => {
                KycError::ContractRevert { category, message }
            }
        }
    }

    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            KycError::ProviderUnavailable => "provider_unavailable",
            KycError::AuthorizationDenied => "authorization_denied",
            KycError::NotConnected => "not_connected",
            KycError::Busy => "busy",
            KycError::UserRejected => "user_rejected",
            KycError::ContractRevert { .. } => "contract_revert",
            KycError::NetworkFailure(_) => "network_failure",
            KycError::InvalidInput(_) => "invalid_input",
            KycError::Upload(_) => "upload_failed",
        }
    }
}

impl From<RawError> for KycError {
    fn from(raw: RawError) -> Self {
        KycError::from_raw(&raw)
    }
}
