// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The result of handling one event: what to persist and what to say.

use listbot_core::{Commit, ImageRef, InlineOption, ListbotError, MessageRef};

/// One outbound side effect, always addressed to the chat the event came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Text(String),
    Photo(ImageRef),
    ButtonMenu {
        text: String,
        rows: Vec<Vec<String>>,
        reply_to: Option<MessageRef>,
    },
    InlineOptions {
        text: String,
        rows: Vec<Vec<InlineOption>>,
    },
    ClearMenu {
        text: String,
        reply_to: Option<MessageRef>,
    },
    PrivateRedirect {
        text: String,
        label: String,
        start_param: String,
    },
}

impl Effect {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::Text(_) => "text",
            Effect::Photo(_) => "photo",
            Effect::ButtonMenu { .. } => "button_menu",
            Effect::InlineOptions { .. } => "inline_options",
            Effect::ClearMenu { .. } => "clear_menu",
            Effect::PrivateRedirect { .. } => "private_redirect",
        }
    }
}

/// Handler output. Effects are delivered only after the commit is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    pub commit: Commit,
    pub effects: Vec<Effect>,
    /// The input was refused. A rejected turn never writes anything.
    pub rejected: bool,
}

impl Turn {
    pub fn new(commit: Commit) -> Self {
        Self {
            commit,
            ..Self::default()
        }
    }

    /// A turn that only talks.
    pub fn reply() -> Self {
        Self::default()
    }

    /// Refuses the input, telling the user why. Follow-up effects (such as
    /// re-rendered options) may be chained.
    pub fn rejected(error: &ListbotError) -> Self {
        Self::refuse().text(error.to_string())
    }

    /// Refuses the input silently; chain the corrective prompt.
    pub fn refuse() -> Self {
        Self {
            rejected: true,
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.effects.push(Effect::Text(text.into()));
        self
    }

    pub fn photo(mut self, image: ImageRef) -> Self {
        self.effects.push(Effect::Photo(image));
        self
    }

    pub fn menu(
        mut self,
        text: impl Into<String>,
        rows: Vec<Vec<String>>,
        reply_to: Option<MessageRef>,
    ) -> Self {
        self.effects.push(Effect::ButtonMenu {
            text: text.into(),
            rows,
            reply_to,
        });
        self
    }

    pub fn options(mut self, text: impl Into<String>, rows: Vec<Vec<InlineOption>>) -> Self {
        self.effects.push(Effect::InlineOptions {
            text: text.into(),
            rows,
        });
        self
    }

    pub fn clear_menu(mut self, text: impl Into<String>, reply_to: Option<MessageRef>) -> Self {
        self.effects.push(Effect::ClearMenu {
            text: text.into(),
            reply_to,
        });
        self
    }

    pub fn redirect(
        mut self,
        text: impl Into<String>,
        label: impl Into<String>,
        start_param: impl Into<String>,
    ) -> Self {
        self.effects.push(Effect::PrivateRedirect {
            text: text.into(),
            label: label.into(),
            start_param: start_param.into(),
        });
        self
    }

    pub fn extend(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}
