// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use kyc_client::{
    config::{KycConfig, LogFormat, DEFAULT_LOG_FILTER},
    providers::PinataClient,
    wallet::{LocalWallet, WalletProvider},
    KycSession,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match KycConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    let wallet = match &config.wallet_keys {
        Some(source) => match LocalWallet::from_key_source(config.network.clone(), source) {
            Ok(wallet) => Some(Arc::new(wallet) as Arc<dyn WalletProvider>),
            Err(e) => {
                error!(error = %e, "Failed to load wallet keys");
                return ExitCode::FAILURE;
            }
        },
        None => {
            warn!("No wallet key configured, connecting will fail");
            None
        }
    };

    let mut session = KycSession::new(config.contract_address, wallet);
    match config.pinata.clone().map(PinataClient::new).transpose() {
        Ok(Some(pinata)) => session = session.with_pinning(Arc::new(pinata)),
        Ok(None) => warn!("Pinata credentials not set, document uploads are disabled"),
        Err(e) => {
            error!(error = %e, "Failed to configure Pinata");
            return ExitCode::FAILURE;
        }
    }
    let session = Arc::new(session);

    info!(
        contract = %config.contract_address,
        rpc_url = %config.network.rpc_url,
        chain_id = config.network.chain_id,
        "Starting KYC client"
    );

    match session.connect().await {
        Ok(account) => {
            let state = session.state();
            info!(
                account = %account,
                role = %state.user_role,
                last_error = ?state.last_error,
                "Session ready"
            );
        }
        Err(e) => error!(error = %e, code = e.error_code(), "Wallet connection failed"),
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    session.disconnect();
    info!("KYC client stopped");
    ExitCode::SUCCESS
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
