// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Private key loading for the local wallet.
//!
//! Keys arrive either as hex strings or as PEM files (SEC1 `EC PRIVATE KEY`
//! or PKCS#8 `PRIVATE KEY`). Both end up as alloy [`PrivateKeySigner`]s.

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

use super::WalletError;

const SEC1_TAG: &str = "EC PRIVATE KEY";
const PKCS8_TAG: &str = "PRIVATE KEY";

/// Decode a PEM private key to its 32-byte scalar as lowercase hex, no `0x`.
///
/// The PEM label picks the decoder; unlabelled content is not guessed at.
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, WalletError> {
    let block = std::str::from_utf8(pem_bytes)
        .map_err(|e| e.to_string())
        .and_then(|text| pem::parse(text).map_err(|e| e.to_string()))
        .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid PEM: {e}")))?;

    let secret_key = match block.tag() {
        SEC1_TAG => SecretKey::from_sec1_der(block.contents()).map_err(|e| e.to_string()),
        PKCS8_TAG => parse_pkcs8_to_secret_key(block.contents()),
        other => Err(format!("unsupported PEM label {other:?}")),
    }
    .map_err(|e| WalletError::InvalidPrivateKey(format!("Invalid key format: {e}")))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key, with or without `0x`.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, WalletError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))
}

/// Create a signer from PEM-encoded private key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, WalletError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Read a PEM key file and create a signer from it.
pub fn signer_from_pem_file(path: &Path) -> Result<PrivateKeySigner, WalletError> {
    let bytes = std::fs::read(path)
        .map_err(|e| WalletError::KeyFile(format!("{}: {}", path.display(), e)))?;
    signer_from_pem(&bytes)
}
