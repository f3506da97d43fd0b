// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pinata IPFS pinning integration for KYC documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde::Deserialize;
use tracing::info;

use super::{PinningError, PinningService};
use crate::config::PinataConfig;

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Pinata `pinFileToIPFS` client.
#[derive(Debug, Clone)]
pub struct PinataClient {
    api_base_url: String,
    api_key: String,
    secret_key: String,
    gateway_base: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

impl PinataClient {
    /// Build a client. Both API key and secret are required.
    pub fn new(config: PinataConfig) -> Result<Self, PinningError> {
        if config.api_key.is_empty() || config.secret_key.is_empty() {
            return Err(PinningError::MissingConfig(
                "Pinata API key and secret are required".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PinningError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            secret_key: config.secret_key,
            gateway_base: gateway_base(&config.gateway),
            http,
        })
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, PinningError> {
        let size = bytes.len();
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}{PIN_FILE_PATH}", self.api_base_url))
            .header("pinata_api_key", self.api_key.as_str())
            .header("pinata_secret_api_key", self.secret_key.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinningError::Request(format!("POST {PIN_FILE_PATH} failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PinningError::Request(format!("POST {PIN_FILE_PATH} body unreadable: {e}"))
        })?;
        let ipfs_hash = pinned_hash(status, &body)?;

        info!(
            file_name = %file_name,
            size,
            ipfs_hash = %ipfs_hash,
            "Pinned document to IPFS"
        );

        Ok(ipfs_hash)
    }

    fn gateway_url(&self, content_hash: &str) -> String {
        format!("{}{content_hash}", self.gateway_base)
    }
}

/// Content hash from a `pinFileToIPFS` reply.
fn pinned_hash(status: StatusCode, body: &str) -> Result<String, PinningError> {
    if !status.is_success() {
        return Err(PinningError::Request(format!(
            "POST {PIN_FILE_PATH} returned {status}: {body}"
        )));
    }

    let pinned: PinFileResponse = serde_json::from_str(body).map_err(|e| {
        PinningError::InvalidResponse(format!("POST {PIN_FILE_PATH} invalid JSON: {e}"))
    })?;

    if pinned.ipfs_hash.is_empty() {
        return Err(PinningError::InvalidResponse(
            "missing IpfsHash in response".to_string(),
        ));
    }

    Ok(pinned.ipfs_hash)
}

/// Normalize a configured gateway (`host`, `host/ipfs/` or full URL) into
/// `https://host/ipfs/`.
fn gateway_base(gateway: &str) -> String {
    let trimmed = gateway.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if with_scheme.ends_with("/ipfs") {
        format!("{with_scheme}/")
    } else {
        format!("{with_scheme}/ipfs/")
    }
}
