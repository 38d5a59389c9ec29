// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item records and the query filter draft.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::tags::TagSet;
use crate::types::ImageRef;

/// A saved record (place, restaurant, ...). `name` is the primary key within a chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: BTreeSet<ImageRef>,
    #[serde(default)]
    pub tags: TagSet,
}

impl Item {
    /// A fresh draft carrying only its name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a photo reference. Returns `false` for a duplicate.
    pub fn add_image(&mut self, image: ImageRef) -> bool {
        self.images.insert(image)
    }
}

/// Filter being assembled by the query workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QueryFilter {
    /// No filter chosen yet.
    #[default]
    Unset,
    /// Exact item name.
    Name(String),
    /// A single term matched against tags and names.
    TagOrName(String),
    /// Items carrying every listed tag.
    Tags(TagSet),
    /// Every item in the chat.
    All,
}

impl QueryFilter {
    /// Whether `item` satisfies this filter. `Unset` matches nothing.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            QueryFilter::Unset => false,
            QueryFilter::Name(name) => item.name == *name,
            QueryFilter::TagOrName(term) => {
                item.name == *term || item.tags.iter().any(|t| t.eq_ignore_ascii_case(term))
            }
            QueryFilter::Tags(tags) => item.tags.is_superset(tags),
            QueryFilter::All => true,
        }
    }
}

/// Per-conversation query state persisted between query turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDraft {
    pub filter: QueryFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe() -> Item {
        let mut item = Item::named("Cafe A");
        item.tags.add("coffee");
        item.tags.add("brunch");
        item
    }

    #[test]
    fn duplicate_image_is_ignored() {
        let mut item = Item::named("x");
        assert!(item.add_image(ImageRef("p1".into())));
        assert!(!item.add_image(ImageRef("p1".into())));
        assert_eq!(item.images.len(), 1);
    }

    #[test]
    fn tag_or_name_matches_either() {
        assert!(QueryFilter::TagOrName("coffee".into()).matches(&cafe()));
        assert!(QueryFilter::TagOrName("Cafe A".into()).matches(&cafe()));
        assert!(QueryFilter::TagOrName("COFFEE".into()).matches(&cafe()));
        assert!(!QueryFilter::TagOrName("bar".into()).matches(&cafe()));
    }

    #[test]
    fn name_filter_is_case_sensitive() {
        assert!(QueryFilter::Name("Cafe A".into()).matches(&cafe()));
        assert!(!QueryFilter::Name("cafe a".into()).matches(&cafe()));
    }

    #[test]
    fn tags_filter_requires_all_tags() {
        let both: TagSet = ["coffee", "brunch"].into_iter().collect();
        let extra: TagSet = ["coffee", "bar"].into_iter().collect();
        assert!(QueryFilter::Tags(both).matches(&cafe()));
        assert!(!QueryFilter::Tags(extra).matches(&cafe()));
    }

    #[test]
    fn unset_filter_matches_nothing() {
        assert!(!QueryFilter::Unset.matches(&cafe()));
        assert!(QueryFilter::All.matches(&cafe()));
    }

    #[test]
    fn item_payload_tolerates_missing_optional_fields() {
        let item: Item = serde_json::from_str(r#"{"name":"Noodle Bar"}"#).unwrap();
        assert_eq!(item, Item::named("Noodle Bar"));
    }
}
