// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Digital KYC Client - Wallet session and contract client for the KYC registry
//!
//! This crate connects a wallet to the DigitalKYC contract, resolves the
//! caller's role (customer, bank employee, admin) and drives the KYC
//! workflow. Documents are pinned to IPFS and only their hash goes on-chain.
//!
//! ## Modules
//!
//! - `blockchain` - Contract binding, typed calls and records
//! - `config` - Environment configuration
//! - `error` - Session error taxonomy
//! - `normalize` - User-facing error messages
//! - `providers` - Document pinning (Pinata)
//! - `roles` - On-chain user roles
//! - `session` - The observable session store
//! - `upload` - Pending document uploads
//! - `wallet` - Wallet provider boundary and local wallet

pub mod blockchain;
pub mod config;
pub mod error;
pub mod normalize;
pub mod providers;
pub mod roles;
pub mod session;
pub mod upload;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use error::KycError;
pub use roles::UserRole;
pub use session::{KycSession, SessionSnapshot, SessionState};
pub use upload::{PendingUpload, SubmitError};
