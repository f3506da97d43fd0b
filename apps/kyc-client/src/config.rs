// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`KycConfig`] loaded from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `KYC_CONTRACT_ADDRESS` | Deployed DigitalKYC contract | `0x2f24…cdbc` |
//! | `KYC_RPC_URL` | JSON-RPC endpoint of the contract's network | `http://127.0.0.1:8545` |
//! | `KYC_CHAIN_ID` | Chain id the contract is deployed on | `31337` |
//! | `KYC_WALLET_KEY` | Hex private key(s), comma separated | Optional |
//! | `KYC_WALLET_KEY_PEM_PATH` | PEM private key file (SEC1 or PKCS#8) | Optional |
//! | `PINATA_API_KEY` | Pinata API key | Required for uploads |
//! | `PINATA_SECRET_KEY` | Pinata API secret | Required for uploads |
//! | `PINATA_API_URL` | Pinata API base URL | `https://api.pinata.cloud` |
//! | `PINATA_GATEWAY` | Gateway host or URL for document links | `gateway.pinata.cloud` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,kyc_client=debug` |
//!
//! Without a wallet key there is no wallet provider, and `connect` fails
//! with `ProviderUnavailable`.

use std::{path::PathBuf, str::FromStr};

use alloy::primitives::Address;
use url::Url;

pub const CONTRACT_ADDRESS_ENV: &str = "KYC_CONTRACT_ADDRESS";
pub const RPC_URL_ENV: &str = "KYC_RPC_URL";
pub const CHAIN_ID_ENV: &str = "KYC_CHAIN_ID";
pub const WALLET_KEY_ENV: &str = "KYC_WALLET_KEY";
pub const WALLET_KEY_PEM_PATH_ENV: &str = "KYC_WALLET_KEY_PEM_PATH";
pub const PINATA_API_KEY_ENV: &str = "PINATA_API_KEY";
pub const PINATA_SECRET_KEY_ENV: &str = "PINATA_SECRET_KEY";
pub const PINATA_API_URL_ENV: &str = "PINATA_API_URL";
pub const PINATA_GATEWAY_ENV: &str = "PINATA_GATEWAY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// The contract address is only valid on the network it was deployed to.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x2f243960a2af242271f75b43af37df36b8f3cdbc";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_CHAIN_ID: u64 = 31337;
pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_PINATA_GATEWAY: &str = "gateway.pinata.cloud";
pub const DEFAULT_LOG_FILTER: &str = "info,kyc_client=debug";

/// Configuration loading failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Network the contract lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub rpc_url: Url,
    pub chain_id: u64,
}

/// Where the local wallet's keys come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletKeySource {
    /// Hex-encoded keys, first one is the active account.
    Hex(Vec<String>),
    PemFile(PathBuf),
}

/// Pinata API credentials and gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinataConfig {
    pub api_url: String,
    pub api_key: String,
    pub secret_key: String,
    pub gateway: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycConfig {
    pub contract_address: Address,
    pub network: NetworkConfig,
    pub wallet_keys: Option<WalletKeySource>,
    pub pinata: Option<PinataConfig>,
    pub log_format: LogFormat,
}

impl KycConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let contract_raw =
            get(CONTRACT_ADDRESS_ENV).unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string());
        let contract_address = Address::from_str(&contract_raw).map_err(|e| invalid(
            CONTRACT_ADDRESS_ENV,
            e,
        ))?;

        let rpc_raw = get(RPC_URL_ENV).unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = Url::parse(&rpc_raw).map_err(|e| invalid(RPC_URL_ENV, e))?;

        let chain_id = match get(CHAIN_ID_ENV) {
            Some(raw) => raw.parse().map_err(|e| invalid(CHAIN_ID_ENV, e))?,
            None => DEFAULT_CHAIN_ID,
        };

        let wallet_keys = match (get(WALLET_KEY_ENV), get(WALLET_KEY_PEM_PATH_ENV)) {
            (Some(keys), _) => Some(WalletKeySource::Hex(
                keys.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect(),
            )),
            (None, Some(path)) => Some(WalletKeySource::PemFile(PathBuf::from(path))),
            (None, None) => None,
        };

        let pinata = match (get(PINATA_API_KEY_ENV), get(PINATA_SECRET_KEY_ENV)) {
            (Some(api_key), Some(secret_key)) => Some(PinataConfig {
                api_url: get(PINATA_API_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_PINATA_API_URL.to_string()),
                api_key,
                secret_key,
                gateway: get(PINATA_GATEWAY_ENV)
                    .unwrap_or_else(|| DEFAULT_PINATA_GATEWAY.to_string()),
            }),
            (Some(_), None) => return Err(ConfigError::Missing(PINATA_SECRET_KEY_ENV.into())),
            (None, Some(_)) => return Err(ConfigError::Missing(PINATA_API_KEY_ENV.into())),
            (None, None) => None,
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()) {
            None => LogFormat::default(),
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT_ENV.to_string(),
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            contract_address,
            network: NetworkConfig { rpc_url, chain_id },
            wallet_keys,
            pinata,
            log_format,
        })
    }
}

fn invalid(var: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        reason: err.to_string(),
    }
}
