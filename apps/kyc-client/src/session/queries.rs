// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only contract queries.

use alloy::primitives::Address;
use tracing::{debug, warn};
use uuid::Uuid;

use super::KycSession;
use crate::blockchain::{calls, KycRecord};
use crate::error::KycError;

impl KycSession {
    /// Load `applicant`'s KYC record into the single record slot.
    ///
    /// The slot is emptied first and stays empty if the lookup fails.
    pub async fn fetch_kyc_record(&self, applicant: Address) -> Result<KycRecord, KycError> {
        let _guard = self.begin()?;
        let operation_id = Uuid::new_v4();

        let (generation, binding) = {
            let state = self.state.borrow();
            (state.generation, state.binding())
        };
        let Some((_, contract)) = binding else {
            self.record_error(generation, &KycError::NotConnected);
            return Err(KycError::NotConnected);
        };

        self.commit(generation, |s| {
            s.is_loading = true;
            s.last_error = None;
            s.current_kyc = None;
        });

        match contract.kyc_details(applicant).await {
            Ok(details) => {
                let record = KycRecord::from_details(applicant, details);
                debug!(
                    operation_id = %operation_id,
                    applicant = %applicant,
                    status = %record.status,
                    "Loaded KYC record"
                );
                let stored = record.clone();
                self.commit(generation, |s| {
                    s.current_kyc = Some(stored);
                    s.is_loading = false;
                });
                Ok(record)
            }
            Err(raw) => {
                let err = KycError::from_raw(&raw);
                warn!(
                    operation_id = %operation_id,
                    applicant = %applicant,
                    error = %raw,
                    "KYC record lookup failed"
                );
                self.record_error(generation, &err);
                Err(err)
            }
        }
    }

    /// Replace the employee list with the accounts registered for `ifsc`.
    ///
    /// An empty list is a normal answer.
    pub async fn fetch_ifsc_employees(&self, ifsc: &str) -> Result<Vec<Address>, KycError> {
        let _guard = self.begin()?;
        let operation_id = Uuid::new_v4();
        let ifsc = ifsc.trim();

        let (generation, binding) = {
            let state = self.state.borrow();
            (state.generation, state.binding())
        };
        let Some((_, contract)) = binding else {
            self.record_error(generation, &KycError::NotConnected);
            return Err(KycError::NotConnected);
        };
        calls::require(ifsc, calls::MISSING_IFSC)?;

        self.commit(generation, |s| {
            s.is_loading = true;
            s.last_error = None;
        });

        match contract.ifsc_employees(ifsc).await {
            Ok(employees) => {
                debug!(
                    operation_id = %operation_id,
                    ifsc,
                    count = employees.len(),
                    "Loaded IFSC employees"
                );
                let stored = employees.clone();
                self.commit(generation, |s| {
                    s.ifsc_employees = stored;
                    s.is_loading = false;
                });
                Ok(employees)
            }
            Err(raw) => {
                let err = KycError::from_raw(&raw);
                warn!(
                    operation_id = %operation_id,
                    ifsc,
                    error = %raw,
                    "IFSC employee lookup failed"
                );
                let message = err.to_string();
                self.commit(generation, |s| {
                    s.ifsc_employees.clear();
                    s.last_error = Some(message);
                    s.is_loading = false;
                });
                Err(err)
            }
        }
    }
}
