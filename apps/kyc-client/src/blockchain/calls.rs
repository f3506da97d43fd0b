// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! State-changing calls on the DigitalKYC contract.
//!
//! Every write goes through [`KycCall`] so the session can run them through
//! one executor: encode, sign, send, wait for the receipt.

use alloy::{primitives::Address, sol_types::SolCall};

use super::contract::IDigitalKYC;
use crate::error::KycError;

pub(crate) const MISSING_IFSC: &str = "Please enter an IFSC code.";
pub(crate) const MISSING_DOCUMENT: &str = "Please upload your documents first.";
const MISSING_REASON: &str = "Please enter a rejection reason.";
const INVALID_ADDRESS: &str = "Please enter a valid address.";

/// One state-changing contract invocation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycCall {
    /// Grant the Customer role (admin, or self-registration).
    AddCustomer { account: Address },
    /// Grant the BankEmployee role tied to a branch.
    AddBankEmployee { account: Address, ifsc: String },
    /// Grant the Admin role.
    AddAdmin { account: Address },
    /// Re-enable a deactivated account.
    ActivateUser { account: Address },
    /// Block an account from every role-gated call.
    DeactivateUser { account: Address },
    /// Move a bank employee to another branch.
    UpdateEmployeeIfsc { account: Address, new_ifsc: String },
    /// Open an application for the caller.
    SubmitKyc { document_hash: String, ifsc: String },
    /// Replace the caller's document hash.
    UpdateDocumentHash { document_hash: String },
    /// Bank-side verification of a pending application.
    VerifyKyc { applicant: Address },
    /// Reject an application with a reason shown to the applicant.
    RejectKyc { applicant: Address, reason: String },
    /// Final admin approval of a verified application.
    ApproveKyc { applicant: Address },
    /// Move an approved record past its expiry to Expired.
    CheckExpiry { applicant: Address },
}

impl KycCall {
    /// Name of the contract method this call invokes.
    pub fn method_name(&self) -> &'static str {
        match self {
            KycCall::AddCustomer { .. } => "addCustomer",
            KycCall::AddBankEmployee { .. } => "addBankEmployee",
            KycCall::AddAdmin { .. } => "addAdmin",
            KycCall::ActivateUser { .. } => "activateUser",
            KycCall::DeactivateUser { .. } => "deactivateUser",
            KycCall::UpdateEmployeeIfsc { .. } => "updateEmployeeIFSC",
            KycCall::SubmitKyc { .. } => "submitKYC",
            KycCall::UpdateDocumentHash { .. } => "updateIPFSHash",
            KycCall::VerifyKyc { .. } => "verifyKYC",
            KycCall::RejectKyc { .. } => "rejectKYC",
            KycCall::ApproveKyc { .. } => "adminApproveKYC",
            KycCall::CheckExpiry { .. } => "checkExpiry",
        }
    }

    /// ABI-encode the call data (selector + arguments).
    pub fn abi_encode(&self) -> Vec<u8> {
        match self.clone() {
            KycCall::AddCustomer { account } => {
                IDigitalKYC::addCustomerCall { user: account }.abi_encode()
            }
            KycCall::AddBankEmployee { account, ifsc } => IDigitalKYC::addBankEmployeeCall {
                user: account,
                ifscCode: ifsc,
            }
            .abi_encode(),
            KycCall::AddAdmin { account } => {
                IDigitalKYC::addAdminCall { user: account }.abi_encode()
            }
            KycCall::ActivateUser { account } => {
                IDigitalKYC::activateUserCall { user: account }.abi_encode()
            }
            KycCall::DeactivateUser { account } => {
                IDigitalKYC::deactivateUserCall { user: account }.abi_encode()
            }
            KycCall::UpdateEmployeeIfsc { account, new_ifsc } => {
                IDigitalKYC::updateEmployeeIFSCCall {
                    employee: account,
                    newIfsc: new_ifsc,
                }
                .abi_encode()
            }
            KycCall::SubmitKyc {
                document_hash,
                ifsc,
            } => IDigitalKYC::submitKYCCall {
                ipfsHash: document_hash,
                ifscCode: ifsc,
            }
            .abi_encode(),
            KycCall::UpdateDocumentHash { document_hash } => IDigitalKYC::updateIPFSHashCall {
                newHash: document_hash,
            }
            .abi_encode(),
            KycCall::VerifyKyc { applicant } => {
                IDigitalKYC::verifyKYCCall { applicant }.abi_encode()
            }
            KycCall::RejectKyc { applicant, reason } => {
                IDigitalKYC::rejectKYCCall { applicant, reason }.abi_encode()
            }
            KycCall::ApproveKyc { applicant } => {
                IDigitalKYC::adminApproveKYCCall { applicant }.abi_encode()
            }
            KycCall::CheckExpiry { applicant } => {
                IDigitalKYC::checkExpiryCall { applicant }.abi_encode()
            }
        }
    }

    /// Account whose role or status this call changes, if it is a
    /// user-management call.
    pub fn role_target(&self) -> Option<Address> {
        match self {
            KycCall::AddCustomer { account }
            | KycCall::AddBankEmployee { account, .. }
            | KycCall::AddAdmin { account }
            | KycCall::ActivateUser { account }
            | KycCall::DeactivateUser { account }
            | KycCall::UpdateEmployeeIfsc { account, .. } => Some(*account),
            _ => None,
        }
    }

    /// Reject obviously incomplete input before anything is signed.
    pub fn validate(&self) -> Result<(), KycError> {
        match self {
            KycCall::AddBankEmployee { ifsc, .. } => require(ifsc, MISSING_IFSC),
            KycCall::UpdateEmployeeIfsc { new_ifsc, .. } => require(new_ifsc, MISSING_IFSC),
            KycCall::SubmitKyc {
                document_hash,
                ifsc,
            } => {
                require(document_hash, MISSING_DOCUMENT)?;
                require(ifsc, MISSING_IFSC)
            }
            KycCall::UpdateDocumentHash { document_hash } => {
                require(document_hash, MISSING_DOCUMENT)
            }
            KycCall::RejectKyc { reason, .. } => require(reason, MISSING_REASON),
            _ => Ok(()),
        }
    }
}

/// Parse a user-entered account address.
pub fn parse_address(input: &str) -> Result<Address, KycError> {
    input
        .trim()
        .parse::<Address>()
        .map_err(|_| KycError::InvalidInput(INVALID_ADDRESS.to_string()))
}

pub(crate) fn require(value: &str, message: &str) -> Result<(), KycError> {
    if value.trim().is_empty() {
        Err(KycError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}
