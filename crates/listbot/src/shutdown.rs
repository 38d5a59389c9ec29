// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for in-flight turns to finish, then aborts the rest.
pub async fn drain_turns(turns: &mut JoinSet<()>, timeout: Duration) {
    if turns.is_empty() {
        info!("no turns in flight");
        return;
    }

    info!(count = turns.len(), "waiting for in-flight turns to complete");
    let drained = tokio::time::timeout(timeout, async {
        while turns.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        warn!(
            remaining = turns.len(),
            "drain timeout reached, aborting remaining turns"
        );
        turns.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_waits_for_quick_turns() {
        let mut turns = JoinSet::new();
        turns.spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
        });
        drain_turns(&mut turns, Duration::from_secs(5)).await;
        assert!(turns.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn drain_aborts_stuck_turns() {
        let mut turns = JoinSet::new();
        turns.spawn(std::future::pending::<()>());
        drain_turns(&mut turns, Duration::from_secs(1)).await;
        while turns.join_next().await.is_some() {}
        assert!(turns.is_empty());
    }
}
