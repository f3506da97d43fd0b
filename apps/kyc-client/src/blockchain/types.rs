// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract-facing types and display conversions.

use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Display string used when a record carries no expiry.
pub const NO_EXPIRY: &str = "N/A";

/// Role codes returned by `getUserRole`.
pub const ROLE_NONE: u8 = 0;
pub const ROLE_CUSTOMER: u8 = 1;
pub const ROLE_BANK_EMPLOYEE: u8 = 2;
pub const ROLE_ADMIN: u8 = 3;

/// KYC application status as stored by the contract.
///
/// The contract is authoritative for every transition; the client only
/// mirrors the last answer it received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KycStatus {
    Pending,
    VerifiedByEmployee,
    ApprovedByAdmin,
    Rejected,
    Expired,
    /// A status code this client does not know about.
    Unknown(u8),
}

/// Workflow actions a view may offer for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycAction {
    Verify,
    Reject,
    Approve,
    CheckExpiry,
}

impl KycStatus {
    /// Decode the numeric status returned by `getKYCDetails`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => KycStatus::Pending,
            1 => KycStatus::VerifiedByEmployee,
            2 => KycStatus::ApprovedByAdmin,
            3 => KycStatus::Rejected,
            4 => KycStatus::Expired,
            other => KycStatus::Unknown(other),
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            KycStatus::Pending => "Pending",
            KycStatus::VerifiedByEmployee => "VerifiedByEmployee",
            KycStatus::ApprovedByAdmin => "ApprovedByAdmin",
            KycStatus::Rejected => "Rejected",
            KycStatus::Expired => "Expired",
            KycStatus::Unknown(_) => "Unknown",
        }
    }

    /// Actions worth offering from this status.
    ///
    /// This is a hint for the UI only. The contract may still refuse any of
    /// them and that refusal comes back through the normal error path.
    pub fn available_actions(&self) -> &'static [KycAction] {
        match self {
            KycStatus::Pending => &[KycAction::Verify, KycAction::Reject],
            KycStatus::VerifiedByEmployee => &[KycAction::Approve, KycAction::Reject],
            KycStatus::ApprovedByAdmin => &[KycAction::CheckExpiry],
            KycStatus::Rejected | KycStatus::Expired | KycStatus::Unknown(_) => &[],
        }
    }

    /// Whether `action` is offered in this status.
    pub fn permits(&self, action: KycAction) -> bool {
        self.available_actions().contains(&action)
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tuple returned by `getUserDetails`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub role_code: u8,
    pub ifsc_code: String,
    pub is_active: bool,
}

/// Tuple returned by `getKYCDetails`, before display conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKycDetails {
    pub status: u8,
    pub document_hash: String,
    pub expiry: u64,
    pub rejection_reason: String,
    pub last_updated_by: Address,
}

/// Typed projection of one applicant's KYC record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRecord {
    pub applicant: Address,
    pub status: KycStatus,
    pub status_string: String,
    pub document_hash: Option<String>,
    pub expiry_timestamp: Option<u64>,
    pub expiry_date_string: String,
    pub rejection_reason: Option<String>,
    pub last_updated_by: Option<Address>,
}

impl KycRecord {
    /// Build the display record for `applicant` from the raw contract tuple.
    ///
    /// Empty strings, a zero expiry and the zero address all mean "absent".
    pub fn from_details(applicant: Address, details: RawKycDetails) -> Self {
        let status = KycStatus::from_code(details.status);
        let expiry_timestamp = (details.expiry > 0).then_some(details.expiry);

        Self {
            applicant,
            status,
            status_string: status.label().to_string(),
            document_hash: non_empty(details.document_hash),
            expiry_timestamp,
            expiry_date_string: format_expiry(expiry_timestamp),
            rejection_reason: non_empty(details.rejection_reason),
            last_updated_by: (!details.last_updated_by.is_zero())
                .then_some(details.last_updated_by),
        }
    }
}

/// Result of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Format an expiry as a local date-time, or `N/A` when absent.
pub fn format_expiry(expiry: Option<u64>) -> String {
    expiry
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| NO_EXPIRY.to_string())
}
