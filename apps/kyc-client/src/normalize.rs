// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Error Normalizer
//!
//! Turns a [`RawError`] into the single line shown to the user.
//!
//! ## Decision order (first match wins)
//!
//! 1. The wallet holder declined → `Transaction rejected by user.`
//! 2. A structured revert reason → used verbatim
//! 3. `reverted with reason string '<X>'` inside the message → `<X>`
//! 4. Otherwise the raw message, cut to 100 characters plus `...`
//!
//! The contract prefixes its revert strings with a category marker
//! (`AUTH:`, `KYC:`, `USER:`, `IFSC:`). When present, only the text after the
//! marker is kept. The marker format is owned by the contract and is matched
//! literally.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::blockchain::{RawError, RawErrorKind};

pub const USER_REJECTED_MESSAGE: &str = "Transaction rejected by user.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Longest raw message kept before truncation.
pub const MAX_MESSAGE_CHARS: usize = 100;
const ELLIPSIS: &str = "...";

static REVERT_REASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"reverted with reason string '(.*?)'").expect("revert reason pattern is valid")
});

/// Domain category encoded as a prefix in contract revert strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevertCategory {
    Auth,
    Kyc,
    User,
    Ifsc,
}

impl RevertCategory {
    /// Checked in this order.
    pub const ALL: [RevertCategory; 4] = [
        RevertCategory::Auth,
        RevertCategory::Kyc,
        RevertCategory::User,
        RevertCategory::Ifsc,
    ];

    /// Literal prefix the contract puts on revert strings of this category.
    pub fn marker(&self) -> &'static str {
        match self {
            RevertCategory::Auth => "AUTH:",
            RevertCategory::Kyc => "KYC:",
            RevertCategory::User => "USER:",
            RevertCategory::Ifsc => "IFSC:",
        }
    }

    /// Shown when nothing follows the marker.
    pub fn fallback_label(&self) -> &'static str {
        match self {
            RevertCategory::Auth => "Authorization Error",
            RevertCategory::Kyc => "KYC Workflow Error",
            RevertCategory::User => "User Management Error",
            RevertCategory::Ifsc => "IFSC Error",
        }
    }

    /// First category whose marker appears in `message`.
    pub fn detect(message: &str) -> Option<RevertCategory> {
        Self::ALL
            .into_iter()
            .find(|category| message.contains(category.marker()))
    }

    /// Text after `"<MARKER> "`, up to the next occurrence of it.
    fn strip(&self, message: &str) -> String {
        let separator = format!("{} ", self.marker());
        message
            .split(separator.as_str())
            .nth(1)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback_label().to_string())
    }
}

impl std::fmt::Display for RevertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.fallback_label())
    }
}

/// Normalize a failure into a user-facing message.
pub fn normalize(raw: &RawError) -> String {
    normalize_with_category(raw).1
}

/// Like [`normalize`], also returning the category marker that was stripped.
pub fn normalize_with_category(raw: &RawError) -> (Option<RevertCategory>, String) {
    let message = base_message(raw);

    match RevertCategory::detect(&message) {
        Some(category) => (Some(category), category.strip(&message)),
        None => (None, message),
    }
}

fn base_message(raw: &RawError) -> String {
    if raw.kind == RawErrorKind::ActionRejected {
        return USER_REJECTED_MESSAGE.to_string();
    }

    if let Some(reason) = raw.reason.as_deref().filter(|r| !r.is_empty()) {
        return reason.to_string();
    }

    if let Some(quoted) = embedded_revert_reason(&raw.message) {
        return quoted;
    }

    if raw.message.is_empty() {
        return UNKNOWN_ERROR_MESSAGE.to_string();
    }

    truncate(&raw.message)
}

/// Extract `<X>` from `reverted with reason string '<X>'`.
pub fn embedded_revert_reason(message: &str) -> Option<String> {
    REVERT_REASON
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|reason| reason.as_str())
        .filter(|reason| !reason.is_empty())
        .map(str::to_string)
}

fn truncate(message: &str) -> String {
    if message.chars().count() > MAX_MESSAGE_CHARS {
        let head: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        message.to_string()
    }
}
