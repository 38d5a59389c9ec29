// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whatever order the fields are set in, submitting saves the last value of
//! each text field, every distinct image, and the added tags minus the removed.

use listbot_core::{ChatId, ConversationState, ImageRef, Item};
use listbot_engine::TurnOutcome;
use listbot_test_utils::TestHarness;
use proptest::prelude::*;

const NAME: &str = "Corner Cafe";

#[derive(Debug, Clone)]
enum FieldOp {
    Address(String),
    Notes(String),
    Url(String),
    Image(String),
    AddTag(String),
    RemoveTag(String),
}

impl FieldOp {
    fn apply(&self, item: &mut Item) {
        match self {
            FieldOp::Address(v) => item.address = Some(v.clone()),
            FieldOp::Notes(v) => item.notes = Some(v.clone()),
            FieldOp::Url(v) => item.url = Some(v.clone()),
            FieldOp::Image(id) => {
                item.add_image(ImageRef(id.clone()));
            }
            FieldOp::AddTag(tag) => {
                item.tags.add(tag.as_str());
            }
            FieldOp::RemoveTag(tag) => {
                item.tags.remove(tag);
            }
        }
    }

    async fn send(&self, h: &TestHarness) {
        let key = TestHarness::private(1);
        match self {
            FieldOp::Address(v) => {
                h.texts(key, &["/setAddress", v.as_str()]).await;
            }
            FieldOp::Notes(v) => {
                h.texts(key, &["/setNotes", v.as_str()]).await;
            }
            FieldOp::Url(v) => {
                h.texts(key, &["/setURL", v.as_str()]).await;
            }
            FieldOp::Image(id) => {
                h.text(key, "/addImage").await;
                h.photo(key, id).await;
            }
            FieldOp::AddTag(tag) => {
                h.texts(key, &["/addTag", tag.as_str(), "/done"]).await;
            }
            FieldOp::RemoveTag(tag) => {
                h.text(key, "/removeTag").await;
                h.tap(key, tag).await;
                h.tap(key, "/done").await;
            }
        }
    }
}

fn field_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{1,12}"
}

fn tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["cafe", "brunch", "wifi", "late", "bar"]).prop_map(String::from)
}

fn field_op() -> impl Strategy<Value = FieldOp> {
    prop_oneof![
        field_value().prop_map(FieldOp::Address),
        field_value().prop_map(FieldOp::Notes),
        field_value().prop_map(FieldOp::Url),
        "photo-[0-3]".prop_map(FieldOp::Image),
        tag().prop_map(FieldOp::AddTag),
        tag().prop_map(FieldOp::RemoveTag),
    ]
}

async fn submit_after(ops: &[FieldOp]) -> (Option<Item>, ConversationState) {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(1);
    assert_eq!(h.text(key, "/additem").await, TurnOutcome::Advanced);
    assert_eq!(h.text(key, NAME).await, TurnOutcome::Advanced);

    for op in ops {
        op.send(&h).await;
    }

    assert_eq!(h.text(key, "/submit").await, TurnOutcome::Advanced);
    assert_eq!(h.tap(key, "yes").await, TurnOutcome::Advanced);
    (h.item(ChatId(1), NAME).await, h.state(key).await)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn submitted_item_matches_field_history(ops in proptest::collection::vec(field_op(), 0..16)) {
        let mut expected = Item::named(NAME);
        for op in &ops {
            op.apply(&mut expected);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (saved, state) = runtime.block_on(submit_after(&ops));

        prop_assert_eq!(saved, Some(expected));
        prop_assert_eq!(state, ConversationState::Idle);
    }
}
