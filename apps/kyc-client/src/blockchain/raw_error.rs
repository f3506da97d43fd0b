// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Boundary representation of wallet and contract failures.
//!
//! Alloy surfaces failures through several unrelated types (contract errors,
//! transport errors, pending transaction errors). They are flattened here
//! into a single [`RawError`] so the normalizer only has one shape to read.

use alloy::{
    providers::PendingTransactionError,
    sol_types::{Revert, SolError},
    transports::{RpcError, TransportError},
};

/// EIP-1193 error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Broad origin of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawErrorKind {
    /// The wallet holder declined to authorize or sign.
    ActionRejected,
    /// A view call returned no data (`0x`).
    NoData,
    /// The node could not be reached or the request did not complete.
    Network,
    /// Execution reverted.
    Revert,
    Other,
}

/// An unnormalized failure from the wallet or contract boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawError {
    pub kind: RawErrorKind,
    /// Decoded `Error(string)` revert reason, when one was attached.
    pub reason: Option<String>,
    pub message: String,
    /// Contract method involved, when known.
    pub method: Option<String>,
}

impl RawError {
    /// Failure of `kind` with no reason or method attached.
    pub fn new(kind: RawErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            reason: None,
            message: message.into(),
            method: None,
        }
    }

    /// The wallet holder declined.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(RawErrorKind::ActionRejected, message)
    }

    /// Transport or RPC failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RawErrorKind::Network, message)
    }

    /// Anything unclassified.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(RawErrorKind::Other, message)
    }

    /// A revert carrying a structured reason.
    pub fn revert(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(RawErrorKind::Revert, message)
        }
    }

    /// A view call that returned empty data.
    pub fn no_data(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            ..Self::new(RawErrorKind::NoData, message)
        }
    }

    /// Attach the contract method involved.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Whether this failure means "the query produced nothing".
    pub fn is_no_data(&self) -> bool {
        self.kind == RawErrorKind::NoData
    }
}

impl std::fmt::Display for RawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} (reason: {reason})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RawError {}

impl From<TransportError> for RawError {
    fn from(err: TransportError) -> Self {
        match &err {
            RpcError::ErrorResp(payload) => {
                if payload.code == USER_REJECTED_CODE {
                    return RawError::rejected(payload.message.to_string());
                }

                let reason = payload
                    .as_revert_data()
                    .and_then(|data| Revert::abi_decode(&data).ok())
                    .map(|revert| revert.reason);

                match reason {
                    Some(reason) => RawError::revert(reason, payload.message.to_string()),
                    None if payload.message.contains("revert") => {
                        RawError::new(RawErrorKind::Revert, payload.message.to_string())
                    }
                    None => RawError::other(payload.message.to_string()),
                }
            }
            RpcError::Transport(kind) => RawError::network(kind.to_string()),
            _ => RawError::other(err.to_string()),
        }
    }
}

impl From<PendingTransactionError> for RawError {
    fn from(err: PendingTransactionError) -> Self {
        match err {
            PendingTransactionError::TransportError(inner) => inner.into(),
            other => RawError::network(other.to_string()),
        }
    }
}

impl From<alloy::contract::Error> for RawError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::ZeroData(method, source) => {
                RawError::no_data(method, source.to_string())
            }
            alloy::contract::Error::TransportError(inner) => inner.into(),
            alloy::contract::Error::PendingTransactionError(inner) => inner.into(),
            other => RawError::other(other.to_string()),
        }
    }
}
