// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract integration for the DigitalKYC registry.
//!
//! This module provides:
//! - The `sol!` binding and the [`KycContract`] boundary trait
//! - Typed write calls ([`KycCall`]) sent through a single executor
//! - Record types and display conversions for view results
//! - Flattening of alloy failures into [`RawError`]

pub mod calls;
pub mod contract;
pub mod raw_error;
pub mod types;

pub use calls::{parse_address, KycCall};
pub use contract::{AlloyKycContract, KycContract};
pub use raw_error::{RawError, RawErrorKind};
pub use types::*;
