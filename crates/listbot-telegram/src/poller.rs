// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long polling: decoded updates are forwarded to an mpsc channel.

use listbot_core::InputEvent;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::handler;

/// Starts long polling on a background task. Every decodable update is sent
/// to `tx`; the task ends on Ctrl-C or when the dispatcher stops.
pub fn spawn_polling(bot: Bot, tx: mpsc::Sender<InputEvent>) -> JoinHandle<()> {
    info!("starting Telegram long polling");

    let message_tx = tx.clone();
    let callback_tx = tx;

    tokio::spawn(async move {
        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let tx = message_tx.clone();
                async move {
                    match handler::decode_message(&msg) {
                        Some(event) => forward(&tx, event).await,
                        None => debug!(msg_id = msg.id.0, "ignoring unsupported message"),
                    }
                    respond(())
                }
            }))
            .branch(
                Update::filter_callback_query().endpoint(move |query: CallbackQuery| {
                    let tx = callback_tx.clone();
                    async move {
                        match handler::decode_callback(&query) {
                            Some(event) => forward(&tx, event).await,
                            None => debug!("ignoring callback query without data"),
                        }
                        respond(())
                    }
                }),
            );

        Dispatcher::builder(bot, handler)
            .default_handler(|_| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    })
}

async fn forward(tx: &mpsc::Sender<InputEvent>, event: InputEvent) {
    if tx.send(event).await.is_err() {
        warn!("inbound channel closed, dropping update");
    }
}
