// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet event subscription.
//!
//! The subscription is an owned handle: dropping it stops the event task.
//! The task only holds a weak reference to the session, so the session can
//! still be dropped while subscribed.

use std::sync::Weak;

use alloy::primitives::Address;
use tokio::{sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::KycSession;
use crate::wallet::WalletEvent;

pub(super) struct WalletSubscription {
    token: CancellationToken,
    _task: JoinHandle<()>,
}

impl WalletSubscription {
    pub(super) fn spawn(
        session: Weak<KycSession>,
        events: broadcast::Receiver<WalletEvent>,
    ) -> Self {
        let token = CancellationToken::new();
        let task = tokio::spawn(run(session, events, token.clone()));

        Self { token, _task: task }
    }
}

impl Drop for WalletSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run(
    session: Weak<KycSession>,
    mut events: broadcast::Receiver<WalletEvent>,
    token: CancellationToken,
) {
    debug!("Wallet event subscription started");

    loop {
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            event = events.recv() => event,
        };

        let Some(session) = session.upgrade() else {
            break;
        };

        match event {
            Ok(WalletEvent::AccountsChanged(accounts)) => {
                on_accounts_changed(&session, accounts, &token).await;
            }
            Ok(WalletEvent::ChainChanged(chain_id)) => {
                warn!(chain_id, "Wallet changed network, session must be reloaded");
                session.reset(true);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Wallet event subscription lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    debug!("Wallet event subscription stopped");
}

async fn on_accounts_changed(
    session: &KycSession,
    accounts: Vec<Address>,
    token: &CancellationToken,
) {
    if accounts.is_empty() {
        info!("Wallet reported no accounts");
        session.disconnect();
        return;
    }

    // Queue behind whatever is running rather than dropping the event.
    let _guard = session.in_flight.lock().await;
    if token.is_cancelled() {
        return;
    }

    let operation_id = Uuid::new_v4();
    info!(
        operation_id = %operation_id,
        account = %accounts[0],
        "Wallet accounts changed, reconnecting"
    );
    if let Err(e) = session.connect_locked(operation_id).await {
        warn!(operation_id = %operation_id, error = %e, "Reconnect after account change failed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::tests::session_with;
    use super::*;
    use crate::roles::UserRole;
    use crate::session::SessionState;
    use crate::testing::{MockContract, ALICE, BOB};
    use tokio::sync::watch;

    async fn wait_for<F>(rx: &mut watch::Receiver<SessionState>, predicate: F)
    where
        F: FnMut(&SessionState) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("state condition not reached in time")
            .expect("session dropped");
    }

    #[tokio::test]
    async fn account_change_reconnects_with_new_account() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 1);
        contract.set_role(BOB, 3);
        let (session, wallet) = session_with(contract);
        session.connect().await.unwrap();
        let mut rx = session.subscribe();

        wallet.set_accounts(Ok(vec![BOB]));
        wallet.emit(WalletEvent::AccountsChanged(vec![BOB]));

        wait_for(&mut rx, |s| s.account == Some(BOB) && s.is_admin()).await;
        assert!(session.is_subscribed());
        assert_eq!(wallet.receiver_count(), 1);
    }

    #[tokio::test]
    async fn empty_accounts_disconnect() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 1);
        let (session, wallet) = session_with(contract);
        session.connect().await.unwrap();
        let mut rx = session.subscribe();

        wallet.emit(WalletEvent::AccountsChanged(Vec::new()));

        wait_for(&mut rx, |s| !s.is_connected()).await;
        let state = session.state();
        assert_eq!(state.user_role, UserRole::Unregistered);
        assert!(!state.reload_required);
        assert!(!session.is_subscribed());
    }

    #[tokio::test]
    async fn chain_change_resets_and_requests_reload() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 3);
        let (session, wallet) = session_with(contract);
        session.connect().await.unwrap();
        let mut rx = session.subscribe();

        wallet.emit(WalletEvent::ChainChanged(43113));

        wait_for(&mut rx, |s| s.reload_required).await;
        let state = session.state();
        assert!(!state.is_connected());
        assert!(!state.is_admin());
        assert!(!session.is_subscribed());
    }

    #[tokio::test]
    async fn reconnect_after_chain_change_clears_reload_flag() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 1);
        let (session, wallet) = session_with(contract);
        session.connect().await.unwrap();
        let mut rx = session.subscribe();

        wallet.emit(WalletEvent::ChainChanged(43113));
        wait_for(&mut rx, |s| s.reload_required).await;

        session.connect().await.unwrap();

        let state = session.state();
        assert!(!state.reload_required);
        assert!(state.is_connected());
        assert!(state.is_customer());
        assert!(session.is_subscribed());
        assert_eq!(wallet.receiver_count(), 1);
    }

    #[tokio::test]
    async fn disconnect_stops_event_handling() {
        let contract = MockContract::new();
        contract.set_role(ALICE, 1);
        let (session, wallet) = session_with(contract);
        session.connect().await.unwrap();

        session.disconnect();
        wallet.emit(WalletEvent::AccountsChanged(vec![ALICE]));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!session.state().is_connected());
        assert_eq!(wallet.bound(), vec![ALICE]);
    }

    #[tokio::test]
    async fn dropped_session_ends_task() {
        let (session, wallet) = session_with(MockContract::new());
        session.connect().await.unwrap();
        assert_eq!(wallet.receiver_count(), 1);

        drop(session);

        tokio::time::timeout(Duration::from_secs(5), async {
            while wallet.receiver_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("event task did not stop");
    }
}
