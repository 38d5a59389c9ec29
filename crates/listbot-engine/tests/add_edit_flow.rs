// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Add/edit field sub-machine driven end to end through the engine.

use std::time::Duration;

use listbot_core::{
    ChatId, ConversationState, FieldStep, ImageRef, InputEvent, Item, MessageRef, TagSet, UserId,
};
use listbot_engine::TurnOutcome;
use listbot_test_utils::{Delivery, TestHarness};

fn ready() -> ConversationState {
    ConversationState::AddOrEdit(FieldStep::ReadyForNextAction)
}

async fn started(h: &TestHarness, user: i64, name: &str) {
    let key = TestHarness::private(user);
    assert_eq!(h.text(key, "/additem").await, TurnOutcome::Advanced);
    assert_eq!(h.text(key, name).await, TurnOutcome::Advanced);
    assert_eq!(h.state(key).await, ready());
}

async fn full_flow(h: &TestHarness) {
    let key = TestHarness::private(1);
    started(h, 1, "Cafe A").await;

    h.texts(key, &["/setAddress", "1 Main St"]).await;
    h.texts(key, &["/setNotes", "Great coffee"]).await;
    h.texts(key, &["/setNotes", "Great coffee, slow service"]).await;
    h.texts(key, &["/setURL", "https://cafe.example"]).await;
    h.text(key, "/addImage").await;
    h.photo(key, "photo-1").await;
    h.text(key, "/addImage").await;
    h.photo(key, "photo-2").await;

    h.text(key, "/addTag").await;
    h.text(key, "coffee").await;
    h.text(key, "brunch").await;
    h.tap(key, "wifi").await;
    h.text(key, "/done").await;
    assert_eq!(h.state(key).await, ready());

    h.text(key, "/removeTag").await;
    h.tap(key, "brunch").await;
    h.tap(key, "/done").await;

    assert_eq!(h.text(key, "/submit").await, TurnOutcome::Advanced);
    assert_eq!(h.tap(key, "yes").await, TurnOutcome::Advanced);

    let saved = h.item(ChatId(1), "Cafe A").await.expect("item saved");
    assert_eq!(saved.address.as_deref(), Some("1 Main St"));
    assert_eq!(saved.notes.as_deref(), Some("Great coffee, slow service"));
    assert_eq!(saved.url.as_deref(), Some("https://cafe.example"));
    assert_eq!(saved.images.len(), 2);
    assert!(saved.images.contains(&ImageRef("photo-2".into())));
    assert_eq!(saved.tags, ["coffee", "wifi"].into_iter().collect::<TagSet>());

    assert_eq!(h.state(key).await, ConversationState::Idle);
    assert_eq!(h.temp_item(key).await, None);
    assert_eq!(h.chat_target(UserId(1)).await, None);
}

#[tokio::test]
async fn submitted_item_has_last_written_fields_in_memory() {
    let h = TestHarness::new().await.unwrap();
    full_flow(&h).await;
}

#[tokio::test]
async fn submitted_item_has_last_written_fields_in_sqlite() {
    let h = TestHarness::builder().with_sqlite().build().await.unwrap();
    full_flow(&h).await;
}

#[tokio::test]
async fn adding_same_tag_twice_keeps_one() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(2);
    started(&h, 2, "Noodle Bar").await;

    h.text(key, "/addTag").await;
    assert_eq!(h.text(key, "cafe").await, TurnOutcome::Advanced);
    assert_eq!(h.text(key, "cafe").await, TurnOutcome::Unchanged);

    let temp = h.temp_item(key).await.unwrap();
    assert_eq!(temp.tags, ["cafe"].into_iter().collect::<TagSet>());
    assert_eq!(
        h.state(key).await,
        ConversationState::AddOrEdit(FieldStep::SetTags)
    );
    assert!(
        h.sent_texts()
            .await
            .contains(&"Tag \"cafe\" is already added".to_string())
    );
}

#[tokio::test]
async fn slow_acknowledgement_keeps_tap_ahead_of_later_text() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(9);
    started(&h, 9, "Wifi Cafe").await;
    h.text(key, "/addTag").await;
    h.transport.set_acknowledge_delay(Duration::from_millis(50));

    let tap = InputEvent::ButtonSelection {
        chat: key.chat,
        user: key.user,
        payload: "wifi".to_string(),
        selection_id: Some("cb-1".to_string()),
    };
    let done = InputEvent::Text {
        chat: key.chat,
        user: key.user,
        text: "/done".to_string(),
        message: MessageRef(900),
    };

    let (tapped, finished) = tokio::join!(h.engine.handle(tap), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.engine.handle(done).await
    });

    assert_eq!(tapped, TurnOutcome::Advanced);
    assert_eq!(finished, TurnOutcome::Advanced);
    assert_eq!(h.state(key).await, ready());
    let temp = h.temp_item(key).await.unwrap();
    assert_eq!(temp.tags, ["wifi"].into_iter().collect::<TagSet>());
}

#[tokio::test]
async fn removing_absent_tag_leaves_tags_unchanged() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(3);
    started(&h, 3, "Bistro").await;
    h.texts(key, &["/addTag", "cafe", "/done", "/removeTag"])
        .await;

    assert_eq!(h.tap(key, "bar").await, TurnOutcome::Rejected);

    let temp = h.temp_item(key).await.unwrap();
    assert_eq!(temp.tags, ["cafe"].into_iter().collect::<TagSet>());
    assert_eq!(
        h.state(key).await,
        ConversationState::AddOrEdit(FieldStep::RemoveTags)
    );
    let deliveries = h.deliveries().await;
    let last = deliveries.last().unwrap();
    assert_eq!(last.option_payloads(), vec!["cafe", "/done"]);
}

#[tokio::test]
async fn remove_tags_rejects_free_text() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(4);
    started(&h, 4, "Bistro").await;
    h.texts(key, &["/addTag", "cafe", "/done", "/removeTag"])
        .await;

    assert_eq!(h.text(key, "cafe").await, TurnOutcome::Rejected);
    assert_eq!(h.temp_item(key).await.unwrap().tags.len(), 1);
}

#[tokio::test]
async fn photo_in_set_address_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(5);
    started(&h, 5, "Bistro").await;
    h.text(key, "/setAddress").await;

    assert_eq!(h.photo(key, "photo-1").await, TurnOutcome::Rejected);

    assert_eq!(
        h.state(key).await,
        ConversationState::AddOrEdit(FieldStep::SetAddress)
    );
    let temp = h.temp_item(key).await.unwrap();
    assert_eq!(temp.address, None);
    assert!(temp.images.is_empty());
    assert_eq!(
        h.sent_texts().await.last().map(String::as_str),
        Some("Address should be a text")
    );
}

#[tokio::test]
async fn text_in_set_images_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(6);
    started(&h, 6, "Bistro").await;
    h.text(key, "/addImage").await;

    assert_eq!(h.text(key, "not a photo").await, TurnOutcome::Rejected);
    assert_eq!(
        h.state(key).await,
        ConversationState::AddOrEdit(FieldStep::SetImages)
    );
}

#[tokio::test]
async fn name_with_reserved_prefix_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(7);
    h.text(key, "/additem").await;

    assert_eq!(h.text(key, "/setAddress").await, TurnOutcome::Rejected);
    assert_eq!(
        h.state(key).await,
        ConversationState::AddOrEdit(FieldStep::SetName)
    );
    assert_eq!(h.temp_item(key).await, None);
}

#[tokio::test]
async fn overlong_name_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(8);
    h.text(key, "/additem").await;

    let name = "n".repeat(200);
    assert_eq!(h.text(key, &name).await, TurnOutcome::Rejected);
    assert_eq!(h.temp_item(key).await, None);
}

#[tokio::test]
async fn unknown_menu_input_reprompts_with_menu() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(9);
    started(&h, 9, "Bistro").await;
    h.clear().await;

    assert_eq!(h.text(key, "hello?").await, TurnOutcome::Rejected);
    assert_eq!(h.state(key).await, ready());
    match h.last_delivery().await {
        Some(Delivery::ButtonMenu { text, rows, .. }) => {
            assert_eq!(text, "Please select a response from the provided options");
            assert_eq!(rows.len(), 3);
        }
        other => panic!("expected the action menu, got {other:?}"),
    }
}

#[tokio::test]
async fn preview_renders_fields_and_photos_without_moving() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(10);
    started(&h, 10, "Cafe A").await;
    h.texts(key, &["/setURL", "https://cafe.example"]).await;
    h.text(key, "/addImage").await;
    h.photo(key, "photo-1").await;
    h.clear().await;

    assert_eq!(h.text(key, "/preview").await, TurnOutcome::Unchanged);
    assert_eq!(h.state(key).await, ready());

    let deliveries = h.deliveries().await;
    assert_eq!(
        deliveries[0].text(),
        Some("Name: Cafe A\nURL: https://cafe.example\nImages: 1")
    );
    assert!(matches!(&deliveries[1], Delivery::Photo { image, .. } if image.0 == "photo-1"));
    assert!(matches!(deliveries[2], Delivery::ButtonMenu { .. }));
}

#[tokio::test]
async fn cancel_discards_temp_item() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(11);
    started(&h, 11, "Bistro").await;

    h.text(key, "/cancel").await;

    assert_eq!(h.state(key).await, ConversationState::Idle);
    assert_eq!(h.temp_item(key).await, None);
    assert_eq!(h.item(ChatId(11), "Bistro").await, None);
    assert!(matches!(
        h.last_delivery().await,
        Some(Delivery::ClearMenu { .. })
    ));
}

#[tokio::test]
async fn declining_submit_returns_to_menu_without_saving() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(12);
    started(&h, 12, "Bistro").await;
    h.text(key, "/submit").await;

    assert_eq!(h.text(key, "yes").await, TurnOutcome::Rejected);
    assert_eq!(
        h.state(key).await,
        ConversationState::AddOrEdit(FieldStep::ConfirmSubmit)
    );

    h.tap(key, "no").await;
    assert_eq!(h.state(key).await, ready());
    assert_eq!(h.item(ChatId(12), "Bistro").await, None);
    assert!(h.temp_item(key).await.is_some());
}

#[tokio::test]
async fn resubmitting_same_name_overwrites_entirely() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(13);
    let mut old = Item::named("Cafe A");
    old.address = Some("Old street".into());
    old.notes = Some("Old notes".into());
    old.tags.add("old");
    h.seed_item(ChatId(13), old).await;

    started(&h, 13, "Cafe A").await;
    h.texts(key, &["/setAddress", "New street"]).await;
    h.text(key, "/submit").await;
    h.tap(key, "yes").await;

    let saved = h.item(ChatId(13), "Cafe A").await.unwrap();
    assert_eq!(saved.address.as_deref(), Some("New street"));
    assert_eq!(saved.notes, None);
    assert!(saved.tags.is_empty());
}

#[tokio::test]
async fn add_tag_offers_chat_vocabulary_minus_item_tags() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(14);
    let mut seeded = Item::named("Other");
    seeded.tags = ["bar", "cafe", "late"].into_iter().collect();
    h.seed_item(ChatId(14), seeded).await;

    started(&h, 14, "Bistro").await;
    h.texts(key, &["/addTag", "cafe"]).await;
    let last = h.last_delivery().await.unwrap();
    assert_eq!(last.option_payloads(), vec!["bar", "late", "/done"]);
}

#[tokio::test]
async fn edit_keeps_name_and_untouched_fields() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(15);
    let mut item = Item::named("Cafe A");
    item.address = Some("Old street".into());
    item.tags.add("coffee");
    h.seed_item(ChatId(15), item).await;

    assert_eq!(h.text(key, "/edititem").await, TurnOutcome::Advanced);
    assert_eq!(h.tap(key, "Cafe A").await, TurnOutcome::Advanced);
    assert_eq!(h.state(key).await, ready());

    h.texts(key, &["/setNotes", "Now with cake"]).await;
    h.text(key, "/submit").await;
    h.tap(key, "yes").await;

    let saved = h.item(ChatId(15), "Cafe A").await.unwrap();
    assert_eq!(saved.address.as_deref(), Some("Old street"));
    assert_eq!(saved.notes.as_deref(), Some("Now with cake"));
    assert!(saved.tags.contains("coffee"));
}

#[tokio::test]
async fn edit_with_stale_item_rerenders_list() {
    let h = TestHarness::new().await.unwrap();
    let key = TestHarness::private(16);
    h.seed_item(ChatId(16), Item::named("Only")).await;

    h.text(key, "/edititem").await;
    assert_eq!(h.tap(key, "Gone").await, TurnOutcome::Rejected);
    assert_eq!(
        h.state(key).await,
        ConversationState::Edit(listbot_core::EditStep::GetItemToEdit)
    );
    let last = h.last_delivery().await.unwrap();
    assert_eq!(last.option_payloads(), vec!["Only"]);
}
