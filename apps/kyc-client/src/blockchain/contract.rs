// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DigitalKYC contract interactions.

use alloy::{
    primitives::Address,
    providers::Provider,
    rpc::types::TransactionRequest,
    sol,
};
use async_trait::async_trait;

use super::calls::KycCall;
use super::raw_error::RawError;
use super::types::{RawKycDetails, TxOutcome, UserDetails};

// Define the DigitalKYC interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IDigitalKYC {
        function getUserRole(address user) external view returns (uint8);
        function getUserDetails(address user) external view returns (uint8 role, string ifscCode, bool isActive);
        function addCustomer(address user) external;
        function addBankEmployee(address user, string ifscCode) external;
        function addAdmin(address user) external;
        function activateUser(address user) external;
        function deactivateUser(address user) external;
        function updateEmployeeIFSC(address employee, string newIfsc) external;
        function submitKYC(string ipfsHash, string ifscCode) external;
        function updateIPFSHash(string newHash) external;
        function verifyKYC(address applicant) external;
        function rejectKYC(address applicant, string reason) external;
        function adminApproveKYC(address applicant) external;
        function checkExpiry(address applicant) external;
        function getKYCDetails(address applicant) external view returns (uint8 status, string ipfsHash, uint256 expiryDate, string rejectionReason, address lastUpdatedBy);
        function getIFSCEmployees(string ifsc) external view returns (address[]);
    }
}

/// Signer-bound handle to the deployed KYC contract.
///
/// Reads are plain view calls. [`KycContract::send`] submits a state-changing
/// call and resolves once the transaction is confirmed.
#[async_trait]
pub trait KycContract: Send + Sync {
    /// Address of the deployed contract.
    fn address(&self) -> Address;

    async fn user_role(&self, account: Address) -> Result<u8, RawError>;

    async fn user_details(&self, account: Address) -> Result<UserDetails, RawError>;

    async fn kyc_details(&self, applicant: Address) -> Result<RawKycDetails, RawError>;

    async fn ifsc_employees(&self, ifsc: &str) -> Result<Vec<Address>, RawError>;

    async fn send(&self, call: &KycCall) -> Result<TxOutcome, RawError>;
}

/// [`KycContract`] over an alloy provider.
///
/// The provider must carry a wallet filler for `send` to succeed.
pub struct AlloyKycContract<P> {
    contract: IDigitalKYC::IDigitalKYCInstance<P>,
    provider: P,
    address: Address,
}

impl<P: Provider + Clone> AlloyKycContract<P> {
    /// Create a new contract instance.
    pub fn new(address: Address, provider: P) -> Self {
        let contract = IDigitalKYC::new(address, provider.clone());

        Self {
            contract,
            provider,
            address,
        }
    }
}

#[async_trait]
impl<P: Provider + Clone + 'static> KycContract for AlloyKycContract<P> {
    fn address(&self) -> Address {
        self.address
    }

    async fn user_role(&self, account: Address) -> Result<u8, RawError> {
        let role: u8 = self.contract.getUserRole(account).call().await?;
        Ok(role)
    }

    async fn user_details(&self, account: Address) -> Result<UserDetails, RawError> {
        let details = self.contract.getUserDetails(account).call().await?;

        Ok(UserDetails {
            role_code: details.role,
            ifsc_code: details.ifscCode,
            is_active: details.isActive,
        })
    }

    async fn kyc_details(&self, applicant: Address) -> Result<RawKycDetails, RawError> {
        let details = self.contract.getKYCDetails(applicant).call().await?;

        Ok(RawKycDetails {
            status: details.status,
            document_hash: details.ipfsHash,
            // Anything past u64 seconds is not a real date
            expiry: u64::try_from(details.expiryDate).unwrap_or(u64::MAX),
            rejection_reason: details.rejectionReason,
            last_updated_by: details.lastUpdatedBy,
        })
    }

    async fn ifsc_employees(&self, ifsc: &str) -> Result<Vec<Address>, RawError> {
        let employees: Vec<Address> = self
            .contract
            .getIFSCEmployees(ifsc.to_string())
            .call()
            .await?;
        Ok(employees)
    }

    async fn send(&self, call: &KycCall) -> Result<TxOutcome, RawError> {
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(call.abi_encode().into());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| RawError::from(e).with_method(call.method_name()))?;

        let tx_hash = *pending.tx_hash();
        tracing::debug!(
            method = call.method_name(),
            tx_hash = %tx_hash,
            "Transaction submitted, waiting for receipt"
        );

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| RawError::from(e).with_method(call.method_name()))?;

        if !receipt.status() {
            return Err(RawError::new(
                super::raw_error::RawErrorKind::Revert,
                format!("transaction {tx_hash} reverted during execution"),
            )
            .with_method(call.method_name()));
        }

        Ok(TxOutcome {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used as u64,
        })
    }
}
