// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `listbot serve` and `listbot poll`.
//!
//! Both modes wire the SQLite store and the Telegram transport into an
//! [`Engine`], then feed decoded updates through an mpsc channel into the
//! turn loop. `serve` receives updates through the webhook gateway, `poll`
//! through teloxide long polling.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use listbot_config::ListbotConfig;
use listbot_core::{ConversationKey, ConversationStore, InputEvent, ListbotError, PluginAdapter};
use listbot_engine::Engine;
use listbot_engine::recording::register_metrics;
use listbot_gateway::{GatewayState, HealthState, WebhookAuth};
use listbot_storage::SqliteStore;
use listbot_telegram::TelegramTransport;
use tokio::sync::mpsc;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::shutdown;

/// Capacity of the channel between update sources and the turn loop.
const INBOUND_CAPACITY: usize = 256;

/// How long shutdown waits for in-flight turns.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

struct Runtime {
    engine: Arc<Engine>,
    store: Arc<SqliteStore>,
    transport: Arc<TelegramTransport>,
}

async fn build_runtime(config: &ListbotConfig) -> Result<Runtime, ListbotError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let transport = Arc::new(TelegramTransport::new(&config.telegram)?);

    register_metrics();
    let engine = Arc::new(Engine::new(
        store.clone(),
        transport.clone(),
        config.engine.clone(),
    ));

    Ok(Runtime {
        engine,
        store,
        transport,
    })
}

/// Runs the webhook server until SIGINT/SIGTERM.
pub async fn run_serve(config: ListbotConfig) -> Result<(), ListbotError> {
    init_tracing(&config.bot.log_level);
    info!(name = %config.bot.name, "starting listbot serve");

    let runtime = build_runtime(&config).await?;

    if let Some(url) = config.telegram.webhook_url.as_deref() {
        runtime
            .transport
            .register_webhook(url, config.telegram.webhook_secret.as_deref())
            .await?;
    } else {
        warn!("telegram.webhook_url is not set; assuming the webhook is registered elsewhere");
    }

    let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
    let state = GatewayState {
        inbound_tx: tx,
        auth: WebhookAuth {
            secret: config.telegram.webhook_secret.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            store: runtime.store.clone(),
            transport: runtime.transport.clone(),
        },
    };

    let cancel = shutdown::install_signal_handler();

    let gateway_config = config.gateway.clone();
    let server_cancel = cancel.clone();
    let server = tokio::spawn(async move {
        let result = listbot_gateway::start_server(
            &gateway_config,
            state,
            server_cancel.clone().cancelled_owned(),
        )
        .await;
        if result.is_err() {
            server_cancel.cancel();
        }
        result
    });

    run_turn_loop(runtime.engine.clone(), rx, cancel).await;

    let served = server
        .await
        .map_err(|e| ListbotError::Internal(format!("gateway task failed: {e}")))?;
    runtime.store.shutdown().await?;
    served?;

    info!("listbot serve shutdown complete");
    Ok(())
}

/// Runs long polling until SIGINT/SIGTERM.
pub async fn run_poll(config: ListbotConfig) -> Result<(), ListbotError> {
    init_tracing(&config.bot.log_level);
    info!(name = %config.bot.name, "starting listbot poll");

    let runtime = build_runtime(&config).await?;

    let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
    let cancel = shutdown::install_signal_handler();
    let polling = listbot_telegram::spawn_polling(runtime.transport.bot().clone(), tx);

    run_turn_loop(runtime.engine.clone(), rx, cancel).await;

    polling.abort();
    runtime.store.shutdown().await?;

    info!("listbot poll shutdown complete");
    Ok(())
}

/// Handles inbound events until the channel closes or `cancel` fires.
///
/// Turns for different conversations run concurrently. Events for the same
/// conversation are dispatched one at a time in arrival order.
pub async fn run_turn_loop(
    engine: Arc<Engine>,
    mut rx: mpsc::Receiver<InputEvent>,
    cancel: CancellationToken,
) {
    let mut turns = JoinSet::new();
    let mut running: HashMap<task::Id, ConversationKey> = HashMap::new();
    let mut queues = KeyQueues::default();
    let mut open = true;

    loop {
        tokio::select! {
            event = rx.recv(), if open => match event {
                Some(event) => {
                    if let Some(event) = queues.push(event) {
                        spawn_turn(&mut turns, &mut running, &engine, event);
                    }
                }
                None => {
                    info!("inbound channel closed");
                    open = false;
                }
            },
            Some(joined) = turns.join_next_with_id(), if !turns.is_empty() => {
                let id = match joined {
                    Ok((id, ())) => id,
                    Err(e) => {
                        error!(error = %e, "turn task failed");
                        e.id()
                    }
                };
                if let Some(next) = running.remove(&id).and_then(|key| queues.finish(key)) {
                    spawn_turn(&mut turns, &mut running, &engine, next);
                }
            }
            _ = cancel.cancelled() => {
                info!("turn loop shutting down");
                break;
            }
        }

        if !open && turns.is_empty() {
            break;
        }
    }

    let queued = queues.pending();
    if queued > 0 {
        warn!(queued, "dropping queued events at shutdown");
    }
    shutdown::drain_turns(&mut turns, DRAIN_TIMEOUT).await;
}

fn spawn_turn(
    turns: &mut JoinSet<()>,
    running: &mut HashMap<task::Id, ConversationKey>,
    engine: &Arc<Engine>,
    event: InputEvent,
) {
    let key = event.key();
    let engine = engine.clone();
    let handle = turns.spawn(async move {
        engine.handle(event).await;
    });
    running.insert(handle.id(), key);
}

/// Events waiting behind an in-flight turn of the same conversation.
#[derive(Default)]
struct KeyQueues {
    waiting: HashMap<ConversationKey, VecDeque<InputEvent>>,
}

impl KeyQueues {
    /// Returns the event back when its conversation is idle and it may run now.
    fn push(&mut self, event: InputEvent) -> Option<InputEvent> {
        match self.waiting.entry(event.key()) {
            Entry::Occupied(mut busy) => {
                busy.get_mut().push_back(event);
                None
            }
            Entry::Vacant(idle) => {
                idle.insert(VecDeque::new());
                Some(event)
            }
        }
    }

    /// Marks the running turn of `key` done and returns the next event to run.
    fn finish(&mut self, key: ConversationKey) -> Option<InputEvent> {
        let Entry::Occupied(mut busy) = self.waiting.entry(key) else {
            return None;
        };
        let next = busy.get_mut().pop_front();
        if next.is_none() {
            busy.remove();
        }
        next
    }

    fn pending(&self) -> usize {
        self.waiting.values().map(VecDeque::len).sum()
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("listbot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
