// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation FSM states.
//!
//! Every state carries its category in its type, so membership never depends
//! on declaration order. The persisted form is `<category>.<step>`, e.g.
//! `addOrEdit.setTags`; `idle` has no step.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::ListbotError;

/// Steps of the shared add/edit field sub-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum FieldStep {
    SetName,
    ReadyForNextAction,
    SetAddress,
    SetNotes,
    SetUrl,
    SetImages,
    SetTags,
    RemoveTags,
    ConfirmSubmit,
}

/// Steps of the query filter builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum QueryStep {
    SelectType,
    OneTagOrName,
    OneSetName,
    SetTags,
    FewSetNum,
    Retrieve,
}

/// Steps of the delete workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum DeleteStep {
    Select,
    Confirm,
}

/// Steps of the edit workflow before it joins the field sub-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum EditStep {
    GetItemToEdit,
}

/// The five disjoint state categories handlers are selected by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum StateCategory {
    Idle,
    AddOrEdit,
    Query,
    Delete,
    Edit,
}

/// Stored FSM state of one conversation identity. Absent state means `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AddOrEdit(FieldStep),
    Query(QueryStep),
    Delete(DeleteStep),
    Edit(EditStep),
}

impl ConversationState {
    pub fn category(&self) -> StateCategory {
        match self {
            ConversationState::Idle => StateCategory::Idle,
            ConversationState::AddOrEdit(_) => StateCategory::AddOrEdit,
            ConversationState::Query(_) => StateCategory::Query,
            ConversationState::Delete(_) => StateCategory::Delete,
            ConversationState::Edit(_) => StateCategory::Edit,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = self.category();
        match self {
            ConversationState::Idle => write!(f, "{category}"),
            ConversationState::AddOrEdit(step) => write!(f, "{category}.{step}"),
            ConversationState::Query(step) => write!(f, "{category}.{step}"),
            ConversationState::Delete(step) => write!(f, "{category}.{step}"),
            ConversationState::Edit(step) => write!(f, "{category}.{step}"),
        }
    }
}

impl FromStr for ConversationState {
    type Err = ListbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ListbotError::Internal(format!("unrecognized conversation state `{s}`"));

        let (category, step) = match s.split_once('.') {
            Some((category, step)) => (category, Some(step)),
            None => (s, None),
        };
        let category = StateCategory::from_str(category).map_err(|_| invalid())?;

        let state = match (category, step) {
            (StateCategory::Idle, None) => ConversationState::Idle,
            (StateCategory::AddOrEdit, Some(step)) => {
                ConversationState::AddOrEdit(step.parse().map_err(|_| invalid())?)
            }
            (StateCategory::Query, Some(step)) => {
                ConversationState::Query(step.parse().map_err(|_| invalid())?)
            }
            (StateCategory::Delete, Some(step)) => {
                ConversationState::Delete(step.parse().map_err(|_| invalid())?)
            }
            (StateCategory::Edit, Some(step)) => {
                ConversationState::Edit(step.parse().map_err(|_| invalid())?)
            }
            _ => return Err(invalid()),
        };
        Ok(state)
    }
}
