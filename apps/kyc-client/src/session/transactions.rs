// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction executor and the document submission flows built on it.

use tracing::{info, warn};
use uuid::Uuid;

use super::KycSession;
use crate::blockchain::{calls, KycCall, TxOutcome};
use crate::error::KycError;
use crate::providers::PinningError;
use crate::upload::{PendingUpload, SubmitError};

impl KycSession {
    /// Sign and send `call`, then wait for confirmation.
    ///
    /// Failures are normalized, recorded in `last_error` and returned. A
    /// call that changes the caller's own role is followed by a role
    /// refresh.
    pub async fn execute(&self, call: KycCall) -> Result<TxOutcome, KycError> {
        let _guard = self.begin()?;
        self.execute_locked(&call, Uuid::new_v4()).await
    }

    /// Pin the document if needed, then submit an application for `ifsc`.
    ///
    /// On failure the upload comes back inside the error, with its hash if
    /// pinning already succeeded, so a retry does not upload twice.
    pub async fn submit_application(
        &self,
        upload: PendingUpload,
        ifsc: &str,
    ) -> Result<TxOutcome, SubmitError> {
        let ifsc = ifsc.trim().to_string();
        let check = calls::require(&ifsc, calls::MISSING_IFSC);
        self.with_document(upload, check, move |document_hash| KycCall::SubmitKyc {
            document_hash,
            ifsc,
        })
        .await
    }

    /// Pin the document if needed, then replace the caller's document hash.
    pub async fn update_document(&self, upload: PendingUpload) -> Result<TxOutcome, SubmitError> {
        self.with_document(upload, Ok(()), |document_hash| {
            KycCall::UpdateDocumentHash { document_hash }
        })
        .await
    }

    /// `check` is the remaining form validation, run before anything is
    /// uploaded.
    async fn with_document<F>(
        &self,
        mut upload: PendingUpload,
        check: Result<(), KycError>,
        build: F,
    ) -> Result<TxOutcome, SubmitError>
    where
        F: FnOnce(String) -> KycCall,
    {
        let _guard = match self.begin() {
            Ok(guard) => guard,
            Err(error) => return Err(SubmitError { error, upload }),
        };
        let operation_id = Uuid::new_v4();

        let generation = self.generation();
        let connected = self.state.borrow().is_connected();
        if !connected {
            return Err(SubmitError {
                error: KycError::NotConnected,
                upload,
            });
        }
        if let Err(error) = check {
            return Err(SubmitError { error, upload });
        }

        let document_hash = match self.pin(&mut upload, generation, operation_id).await {
            Ok(hash) => hash,
            Err(error) => return Err(SubmitError { error, upload }),
        };

        match self.execute_locked(&build(document_hash), operation_id).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => Err(SubmitError { error, upload }),
        }
    }

    async fn pin(
        &self,
        upload: &mut PendingUpload,
        generation: u64,
        operation_id: Uuid,
    ) -> Result<String, KycError> {
        if let Some(hash) = upload.content_hash() {
            return Ok(hash.to_string());
        }

        let Some(pinning) = self.pinning.clone() else {
            let err = KycError::Upload(PinningError::MissingConfig(
                "no pinning service configured".to_string(),
            ));
            self.record_error(generation, &err);
            return Err(err);
        };

        info!(
            operation_id = %operation_id,
            file_name = upload.file_name(),
            size = upload.size(),
            "Uploading document"
        );

        upload.upload(pinning.as_ref()).await.map_err(|e| {
            let err = KycError::Upload(e);
            self.record_error(generation, &err);
            err
        })
    }

    /// Caller must hold the in-flight guard.
    pub(super) async fn execute_locked(
        &self,
        call: &KycCall,
        operation_id: Uuid,
    ) -> Result<TxOutcome, KycError> {
        let method = call.method_name();
        let (generation, account, contract) = {
            let state = self.state.borrow();
            match state.binding() {
                Some((account, contract)) => (state.generation, account, contract),
                None => return Err(KycError::NotConnected),
            }
        };

        call.validate()?;

        self.commit(generation, |s| {
            s.is_loading = true;
            s.last_error = None;
        });
        info!(
            operation_id = %operation_id,
            method,
            account = %account,
            "Submitting transaction"
        );

        match contract.send(call).await {
            Ok(outcome) => {
                info!(
                    operation_id = %operation_id,
                    method,
                    tx_hash = %outcome.tx_hash,
                    block_number = ?outcome.block_number,
                    gas_used = outcome.gas_used,
                    "Transaction confirmed"
                );
                self.commit(generation, |s| s.is_loading = false);

                if call.role_target() == Some(account) {
                    // Role errors are recorded by the refresh; the
                    // transaction itself went through.
                    let _ = self.refresh_role(operation_id).await;
                }
                Ok(outcome)
            }
            Err(raw) => {
                let err = KycError::from_raw(&raw);
                warn!(
                    operation_id = %operation_id,
                    method,
                    error = %raw,
                    code = err.error_code(),
                    "Transaction failed"
                );
                self.record_error(generation, &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::tests::session_with;
    use super::*;
    use crate::blockchain::RawError;
    use crate::roles::UserRole;
    use crate::testing::{outcome, MockContract, MockPinning, MockWallet, ALICE, BOB, CONTRACT};
    use crate::wallet::WalletProvider;

    #[tokio::test]
    async fn execute_requires_connection() {
        let (session, _) = session_with(MockContract::new());

        let err = session
            .execute(KycCall::VerifyKyc { applicant: BOB })
            .await
            .unwrap_err();

        assert_eq!(err, KycError::NotConnected);
        assert_eq!(session.state().last_error, None);
    }

    #[tokio::test]
    async fn successful_execute_clears_loading_and_error() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 2);
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();
        session.record_error(session.generation(), &KycError::NotConnected);

        let result = session
            .execute(KycCall::VerifyKyc { applicant: BOB })
            .await
            .unwrap();

        let state = session.state();
        assert_eq!(result, outcome());
        assert!(!state.is_loading);
        assert_eq!(state.last_error, None);
        assert_eq!(contract.sent(), vec![KycCall::VerifyKyc { applicant: BOB }]);
    }

    #[tokio::test]
    async fn failed_execute_records_normalized_error() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 2);
        contract.set_send_result(Err(RawError::revert(
            "KYC: Application not pending",
            "execution reverted",
        )));
        let (session, _) = session_with(contract);
        session.connect().await.unwrap();

        let err = session
            .execute(KycCall::VerifyKyc { applicant: BOB })
            .await
            .unwrap_err();

        let state = session.state();
        assert_eq!(err.to_string(), "Application not pending");
        assert!(!state.is_loading);
        assert_eq!(state.last_error.as_deref(), Some("Application not pending"));
    }

    #[tokio::test]
    async fn user_rejection_is_reported() {
        let contract = MockContract::new();
        contract.set_send_result(Err(RawError::rejected("user denied transaction signature")));
        let (session, _) = session_with(contract);
        session.connect().await.unwrap();

        let err = session
            .execute(KycCall::CheckExpiry { applicant: BOB })
            .await
            .unwrap_err();

        assert_eq!(err, KycError::UserRejected);
        assert_eq!(
            session.state().last_error.as_deref(),
            Some("Transaction rejected by user.")
        );
    }

    #[tokio::test]
    async fn invalid_input_is_refused_before_sending() {
        let contract = MockContract::new();
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();

        let err = session
            .execute(KycCall::RejectKyc {
                applicant: BOB,
                reason: " ".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, KycError::InvalidInput(_)));
        assert!(contract.sent().is_empty());
    }

    #[tokio::test]
    async fn self_registration_refreshes_role() {
        let contract = MockContract::new();
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();
        assert_eq!(session.state().user_role, UserRole::Unregistered);

        contract.set_role(ALICE, 1);
        session
            .execute(KycCall::AddCustomer { account: ALICE })
            .await
            .unwrap();

        assert!(session.state().is_customer());
    }

    #[tokio::test]
    async fn granting_role_to_others_does_not_refresh_own_role() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 3);
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();
        let lookups = contract.role_lookups();

        session
            .execute(KycCall::AddBankEmployee {
                account: BOB,
                ifsc: "SBIN0001234".into(),
            })
            .await
            .unwrap();

        assert_eq!(contract.role_lookups(), lookups);
        assert!(session.state().is_admin());
    }

    #[tokio::test]
    async fn overlapping_operations_are_busy() {
        let contract = MockContract::new();
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();
        let gate = contract.hold_sends();

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session.execute(KycCall::CheckExpiry { applicant: BOB }).await
            })
        };
        let mut rx = session.subscribe();
        rx.wait_for(|s| s.is_loading).await.unwrap();

        let second = session.execute(KycCall::VerifyKyc { applicant: BOB }).await;
        assert_eq!(second.unwrap_err(), KycError::Busy);
        assert_eq!(session.fetch_role().await.unwrap_err(), KycError::Busy);

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(contract.sent().len(), 1);
    }

    #[tokio::test]
    async fn disconnect_mid_transaction_discards_result() {
        let contract = MockContract::new();
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();
        let gate = contract.hold_sends();
        contract.set_send_result(Err(RawError::network("timeout")));

        let pending = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session.execute(KycCall::CheckExpiry { applicant: BOB }).await
            })
        };
        let mut rx = session.subscribe();
        rx.wait_for(|s| s.is_loading).await.unwrap();

        session.disconnect();
        gate.notify_one();
        assert!(pending.await.unwrap().is_err());

        let state = session.state();
        assert!(!state.is_loading);
        assert_eq!(state.last_error, None);
    }

    #[tokio::test]
    async fn submit_uploads_then_submits() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 1);
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();

        let upload = PendingUpload::new("aadhaar.pdf", vec![1, 2, 3]);
        session.submit_application(upload, " SBIN0001234 ").await.unwrap();

        assert_eq!(
            contract.sent(),
            vec![KycCall::SubmitKyc {
                document_hash: "QmDoc".into(),
                ifsc: "SBIN0001234".into(),
            }]
        );
    }

    #[tokio::test]
    async fn submit_without_ifsc_keeps_upload_untouched() {
        let contract = MockContract::new();
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();

        let upload = PendingUpload::new("aadhaar.pdf", vec![1]);
        let err = session.submit_application(upload, "").await.unwrap_err();

        assert_eq!(
            err.error,
            KycError::InvalidInput("Please enter an IFSC code.".into())
        );
        assert_eq!(err.upload.content_hash(), None);
        assert!(contract.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_submit_returns_pinned_upload() {
        let contract = MockContract::new();
        contract.set_send_result(Err(RawError::revert(
            "KYC: Application already exists",
            "execution reverted",
        )));
        let (session, _) = session_with(contract.clone());
        session.connect().await.unwrap();

        let upload = PendingUpload::new("aadhaar.pdf", vec![1]);
        let err = session
            .submit_application(upload, "SBIN0001234")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Application already exists");
        assert_eq!(err.upload.content_hash(), Some("QmDoc"));
    }

    #[tokio::test]
    async fn upload_failure_is_recorded_and_nothing_is_sent() {
        let contract = MockContract::new();
        let wallet = MockWallet::new(vec![ALICE], contract.clone());
        let session = Arc::new(
            KycSession::new(CONTRACT, Some(wallet as Arc<dyn WalletProvider>)).with_pinning(
                Arc::new(MockPinning::failing(PinningError::Request("502".into()))),
            ),
        );
        session.connect().await.unwrap();

        let err = session
            .update_document(PendingUpload::new("new.pdf", vec![4]))
            .await
            .unwrap_err();

        assert_eq!(err.error, KycError::Upload(PinningError::Request("502".into())));
        assert_eq!(err.upload.progress(), 0);
        assert!(session.state().last_error.is_some());
        assert!(contract.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_pinning_service_is_an_upload_error() {
        let contract = MockContract::new();
        let wallet = MockWallet::new(vec![ALICE], contract);
        let session = Arc::new(KycSession::new(
            CONTRACT,
            Some(wallet as Arc<dyn WalletProvider>),
        ));
        session.connect().await.unwrap();

        let err = session
            .update_document(PendingUpload::new("new.pdf", vec![4]))
            .await
            .unwrap_err();

        assert!(matches!(
            err.error,
            KycError::Upload(PinningError::MissingConfig(_))
        ));
    }
}
