// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guided query builder.
//!
//! `SelectType` branches into a name lookup, a tag-or-name lookup (optionally
//! widened to several tags) or browsing. Every branch that can match more
//! than one item ends in `FewSetNum`, which asks for a count and retrieves in
//! the same turn.

use listbot_core::{
    ChatId, Commit, ConversationState, InlineOption, Item, ListbotError, QueryDraft, QueryFilter,
    QueryStep, Slot, TagSet,
};
use rand::seq::SliceRandom;
use tracing::debug;

use super::{Ctx, Input, add_edit::photos, validate_label};
use crate::render::{NO_MATCHES, PICK_FROM_OPTIONS, is_done, item_details, single_column, tag_rows};
use crate::router::target_chat;
use crate::turn::Turn;

const BY_NAME: &str = "/byName";
const BY_TAG: &str = "/byTag";
const BROWSE: &str = "/browse";
const MULTIPLE: &str = "/multiple";

const TYPE_PROMPT: &str = "How do you want to look items up?";
const NAME_PROMPT: &str = "Which item do you want to see?";
const TAG_OR_NAME_PROMPT: &str =
    "Pick a tag, or type a tag or name. Choose /multiple to combine several tags";
const TAGS_PROMPT: &str = "Pick the tags to combine\n\nPress \"/done\" once done!";
const COUNT_PROMPT: &str = "How many items do you want to see?";

fn at(step: QueryStep) -> ConversationState {
    ConversationState::Query(step)
}

fn type_rows() -> Vec<Vec<InlineOption>> {
    vec![
        vec![InlineOption::new("By name", BY_NAME)],
        vec![InlineOption::new("By tag", BY_TAG)],
        vec![InlineOption::new("Browse", BROWSE)],
    ]
}

pub async fn enter(_ctx: &Ctx<'_>, _target: ChatId) -> Result<Turn, ListbotError> {
    let commit = Commit::to(at(QueryStep::SelectType))
        .with_query_draft(Slot::Set(QueryDraft::default()));
    Ok(Turn::new(commit).options(TYPE_PROMPT, type_rows()))
}

pub async fn handle(ctx: &Ctx<'_>, step: QueryStep) -> Result<Turn, ListbotError> {
    match step {
        QueryStep::SelectType => select_type(ctx).await,
        QueryStep::OneSetName => one_name(ctx).await,
        QueryStep::OneTagOrName => one_tag_or_name(ctx).await,
        QueryStep::SetTags => set_tags(ctx).await,
        QueryStep::FewSetNum => set_count(ctx).await,
        QueryStep::Retrieve => {
            let filter = current_filter(ctx).await?;
            retrieve(ctx, &filter, ctx.config.default_result_count).await
        }
    }
}

async fn select_type(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let Input::Button(choice) = ctx.input() else {
        return Ok(Turn::refuse()
            .text(PICK_FROM_OPTIONS)
            .options(TYPE_PROMPT, type_rows()));
    };
    let target = target_chat(ctx).await?;

    let turn = match choice {
        BY_NAME => {
            let names = ctx.store.list_item_names(target).await?;
            Turn::new(Commit::to(at(QueryStep::OneSetName)))
                .options(NAME_PROMPT, single_column(names.iter().map(String::as_str)))
        }
        BY_TAG => {
            let vocabulary = ctx.store.list_tags(target).await?;
            Turn::new(Commit::to(at(QueryStep::OneTagOrName)))
                .options(TAG_OR_NAME_PROMPT, tag_or_name_rows(&vocabulary))
        }
        BROWSE => {
            let draft = QueryDraft {
                filter: QueryFilter::All,
            };
            count_prompt(ctx, draft)
        }
        other => {
            return Ok(Turn::rejected(&ListbotError::not_found("option", other))
                .options(TYPE_PROMPT, type_rows()));
        }
    };
    Ok(turn)
}

async fn one_name(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let Some(name) = ctx.choice() else {
        return Err(ListbotError::validation("Please send the item name as text"));
    };
    let filter = QueryFilter::Name(name.to_string());
    let matches = matching(ctx, &filter).await?;
    if matches.is_empty() {
        let target = target_chat(ctx).await?;
        let names = ctx.store.list_item_names(target).await?;
        return Ok(Turn::rejected(&ListbotError::not_found("item", name))
            .options(NAME_PROMPT, single_column(names.iter().map(String::as_str))));
    }
    Ok(finish(matches))
}

async fn one_tag_or_name(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let Some(choice) = ctx.choice() else {
        return Err(ListbotError::validation("Please send a tag or name as text"));
    };
    if choice.eq_ignore_ascii_case(MULTIPLE) {
        let target = target_chat(ctx).await?;
        let vocabulary = ctx.store.list_tags(target).await?;
        let commit = Commit::to(at(QueryStep::SetTags)).with_query_draft(Slot::Set(QueryDraft {
            filter: QueryFilter::Tags(TagSet::new()),
        }));
        return Ok(Turn::new(commit).options(TAGS_PROMPT, tag_rows(&vocabulary)));
    }

    let term = validate_label(choice, "Search term", ctx.config.max_label_len)?;
    let draft = QueryDraft {
        filter: QueryFilter::TagOrName(term),
    };
    Ok(count_prompt(ctx, draft))
}

async fn set_tags(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let Some(choice) = ctx.choice() else {
        return Err(ListbotError::validation("Tag should be a text"));
    };
    let mut tags = match current_filter(ctx).await? {
        QueryFilter::Tags(tags) => tags,
        _ => TagSet::new(),
    };

    if is_done(choice) {
        if tags.is_empty() {
            return Err(ListbotError::validation("Pick at least one tag first"));
        }
        let draft = QueryDraft {
            filter: QueryFilter::Tags(tags),
        };
        return Ok(count_prompt(ctx, draft));
    }

    let tag = validate_label(choice, "Tag", ctx.config.max_label_len)?;
    if !tags.add(tag.clone()) {
        return Ok(Turn::reply().text(format!("Tag \"{tag}\" is already in the filter")));
    }
    let summary = tags.joined(", ");
    let commit = Commit::default().with_query_draft(Slot::Set(QueryDraft {
        filter: QueryFilter::Tags(tags),
    }));
    Ok(Turn::new(commit).text(format!("Filtering by: {summary}")))
}

async fn set_count(ctx: &Ctx<'_>) -> Result<Turn, ListbotError> {
    let count = ctx
        .choice()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|n| *n > 0);
    let Some(count) = count else {
        return Ok(Turn::refuse()
            .text("Please send a positive number")
            .options(COUNT_PROMPT, count_rows(ctx)));
    };
    let filter = current_filter(ctx).await?;
    retrieve(ctx, &filter, count.min(ctx.config.max_result_count)).await
}

/// Persists the draft and asks how many results to show.
fn count_prompt(ctx: &Ctx<'_>, draft: QueryDraft) -> Turn {
    let commit = Commit::to(at(QueryStep::FewSetNum)).with_query_draft(Slot::Set(draft));
    Turn::new(commit).options(COUNT_PROMPT, count_rows(ctx))
}

fn count_rows(ctx: &Ctx<'_>) -> Vec<Vec<InlineOption>> {
    let mut counts = vec![1, ctx.config.default_result_count, ctx.config.max_result_count];
    counts.sort_unstable();
    counts.dedup();
    vec![
        counts
            .into_iter()
            .map(|n| InlineOption::same(n.to_string()))
            .collect(),
    ]
}

fn tag_or_name_rows(vocabulary: &TagSet) -> Vec<Vec<InlineOption>> {
    let mut rows = single_column(vocabulary.iter());
    rows.push(vec![InlineOption::same(MULTIPLE)]);
    rows
}

async fn current_filter(ctx: &Ctx<'_>) -> Result<QueryFilter, ListbotError> {
    Ok(ctx
        .store
        .get_query_draft(ctx.key)
        .await?
        .map(|draft| draft.filter)
        .unwrap_or_default())
}

async fn matching(ctx: &Ctx<'_>, filter: &QueryFilter) -> Result<Vec<Item>, ListbotError> {
    let target = target_chat(ctx).await?;
    let items = ctx.store.list_items(target).await?;
    Ok(items.into_iter().filter(|item| filter.matches(item)).collect())
}

/// Runs the query and returns to idle.
async fn retrieve(
    ctx: &Ctx<'_>,
    filter: &QueryFilter,
    count: usize,
) -> Result<Turn, ListbotError> {
    let matches = matching(ctx, filter).await?;
    debug!(matches = matches.len(), count, "retrieving items");
    Ok(finish(sample(matches, count)))
}

/// Up to `count` items picked at random, ordered by name.
fn sample(items: Vec<Item>, count: usize) -> Vec<Item> {
    let mut picked = if count >= items.len() {
        items
    } else {
        items
            .choose_multiple(&mut rand::thread_rng(), count)
            .cloned()
            .collect()
    };
    picked.sort_by(|a, b| a.name.cmp(&b.name));
    picked
}

fn finish(items: Vec<Item>) -> Turn {
    let commit = Commit::to(ConversationState::Idle)
        .with_query_draft(Slot::Clear)
        .with_chat_target(Slot::Clear);
    if items.is_empty() {
        return Turn::new(commit).text(NO_MATCHES);
    }
    items.iter().fold(Turn::new(commit), |turn, item| {
        turn.text(item_details(item)).extend(photos(item))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<Item> {
        names.iter().map(|n| Item::named(*n)).collect()
    }

    #[test]
    fn sample_returns_everything_when_count_covers_all() {
        let picked = sample(items(&["b", "a", "c"]), 5);
        let names: Vec<_> = picked.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn sample_is_bounded_and_sorted() {
        for _ in 0..20 {
            let picked = sample(items(&["e", "d", "c", "b", "a"]), 2);
            assert_eq!(picked.len(), 2);
            assert!(picked[0].name < picked[1].name);
        }
    }

    #[test]
    fn finish_without_matches_reports_and_goes_idle() {
        let turn = finish(Vec::new());
        assert_eq!(turn.commit.state, Some(ConversationState::Idle));
        assert_eq!(turn.commit.query_draft, Slot::Clear);
        assert_eq!(turn.effects, vec![crate::turn::Effect::Text(NO_MATCHES.into())]);
    }
}
