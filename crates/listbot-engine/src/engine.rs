// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation engine: one event in, one atomic commit, effects out.

use std::sync::Arc;
use std::time::Instant;

use listbot_config::EngineConfig;
use listbot_core::{
    Commit, ConversationKey, ConversationState, ConversationStore, InputEvent, ListbotError, Slot,
    Transport,
};
use strum::Display;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::command::{GlobalCommand, parse_global};
use crate::locks::KeyedLocks;
use crate::recording;
use crate::render::{APOLOGY, HELP_TEXT, RESET_DONE, START_TEXT};
use crate::router;
use crate::turn::{Effect, Turn};
use crate::workflow::{self, Ctx};

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnOutcome {
    /// A commit was persisted.
    Advanced,
    /// Nothing needed persisting.
    Unchanged,
    /// The input was refused with a corrective prompt.
    Rejected,
    /// Storage or an internal fault aborted the turn.
    Failed,
}

/// Drives conversation turns against a store and a transport.
pub struct Engine {
    store: Arc<dyn ConversationStore>,
    transport: Arc<dyn Transport>,
    config: EngineConfig,
    locks: KeyedLocks,
}

impl Engine {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        transport: Arc<dyn Transport>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            transport,
            config,
            locks: KeyedLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handles one inbound event.
    ///
    /// Never returns an error: failures are logged, reported to the user, and
    /// reflected in the returned outcome.
    pub async fn handle(&self, event: InputEvent) -> TurnOutcome {
        let key = event.key();
        let span = info_span!(
            "turn",
            chat = %key.chat,
            user = %key.user,
            channel = event.channel()
        );
        self.run_turn(key, event).instrument(span).await
    }

    async fn run_turn(&self, key: ConversationKey, event: InputEvent) -> TurnOutcome {
        let started = Instant::now();
        let _guard = self.locks.lock(key).await;

        if let InputEvent::ButtonSelection {
            selection_id: Some(id),
            ..
        } = &event
        {
            if let Err(e) = self.transport.acknowledge(id).await {
                warn!(error = %e, "failed to acknowledge button selection");
            }
        }

        let outcome = match self.compute(key, &event).await {
            Ok(turn) => self.finish(key, turn).await,
            Err(e) if e.is_user_facing() => {
                debug!(reason = %e, "input rejected");
                self.deliver(key, vec![Effect::Text(e.to_string())]).await;
                TurnOutcome::Rejected
            }
            Err(e) => {
                error!(error = %e, "turn aborted");
                self.deliver(key, vec![Effect::Text(APOLOGY.to_string())])
                    .await;
                TurnOutcome::Failed
            }
        };

        recording::record_turn(outcome, started.elapsed().as_secs_f64());
        outcome
    }

    async fn compute(&self, key: ConversationKey, event: &InputEvent) -> Result<Turn, ListbotError> {
        let ctx = Ctx {
            store: self.store.as_ref(),
            config: &self.config,
            key,
            event,
        };

        if let InputEvent::Text { text, .. } = event {
            if let Some(command) = parse_global(text) {
                debug!(command = ?command, "global command");
                return self.global(&ctx, command).await;
            }
        }

        let state = self.store.get_state(key).await?;
        debug!(state = %state, "dispatching");
        workflow::dispatch(&ctx, state).await
    }

    async fn global(&self, ctx: &Ctx<'_>, command: GlobalCommand) -> Result<Turn, ListbotError> {
        match command {
            GlobalCommand::Start => Ok(reset(ctx, START_TEXT)),
            GlobalCommand::Reset => Ok(reset(ctx, RESET_DONE)),
            GlobalCommand::Help => {
                let help = self.config.help_text.as_deref().unwrap_or(HELP_TEXT);
                Ok(Turn::reply().text(help))
            }
            GlobalCommand::Begin(op) => router::begin(ctx, op).await,
            GlobalCommand::Resume(op) if ctx.key.is_private() => router::resume(ctx, op).await,
            GlobalCommand::Resume(_) => Ok(reset(ctx, START_TEXT)),
        }
    }

    async fn finish(&self, key: ConversationKey, turn: Turn) -> TurnOutcome {
        let Turn {
            commit,
            effects,
            rejected,
        } = turn;

        if rejected {
            debug!("input rejected");
            self.deliver(key, effects).await;
            return TurnOutcome::Rejected;
        }
        if commit.is_empty() {
            self.deliver(key, effects).await;
            return TurnOutcome::Unchanged;
        }

        let next_state = commit.state;
        let upserted = commit.upsert.is_some();
        let deleted = commit.delete.is_some();
        if let Err(e) = self.store.commit(key, commit).await {
            error!(error = %e, "failed to persist turn");
            self.deliver(key, vec![Effect::Text(APOLOGY.to_string())])
                .await;
            return TurnOutcome::Failed;
        }

        if let Some(state) = next_state {
            debug!(state = %state, "state advanced");
        }
        if upserted {
            recording::record_item_commit("upsert");
        }
        if deleted {
            recording::record_item_commit("delete");
        }
        self.deliver(key, effects).await;
        TurnOutcome::Advanced
    }

    /// Sends every effect in order. Failures are logged and skipped.
    async fn deliver(&self, key: ConversationKey, effects: Vec<Effect>) {
        let chat = key.chat;
        for effect in effects {
            let kind = effect.kind();
            let result = match &effect {
                Effect::Text(text) => self.transport.send_text(chat, text).await,
                Effect::Photo(image) => self.transport.send_photo(chat, image).await,
                Effect::ButtonMenu {
                    text,
                    rows,
                    reply_to,
                } => {
                    self.transport
                        .show_button_menu(chat, text, rows, *reply_to)
                        .await
                }
                Effect::InlineOptions { text, rows } => {
                    self.transport.show_inline_options(chat, text, rows).await
                }
                Effect::ClearMenu { text, reply_to } => {
                    self.transport.clear_menu(chat, text, *reply_to).await
                }
                Effect::PrivateRedirect {
                    text,
                    label,
                    start_param,
                } => {
                    self.transport
                        .send_private_redirect(chat, text, label, start_param)
                        .await
                }
            };
            if let Err(e) = result {
                warn!(error = %e, effect = kind, "delivery failed");
                recording::record_delivery_failure();
            }
        }
    }
}

/// Forces idle, drops staged data, and removes any reply menu.
fn reset(ctx: &Ctx<'_>, text: &str) -> Turn {
    let commit = Commit::to(ConversationState::Idle)
        .with_temp_item(Slot::Clear)
        .with_query_draft(Slot::Clear)
        .with_message_target(Slot::Clear);
    Turn::new(commit).clear_menu(text, ctx.event.message())
}
