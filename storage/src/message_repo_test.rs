//! Unit tests for MessageRepository against an in-memory SQLite DB.

use crate::Stores;
use botify_core::SenderRole;

async fn test_stores() -> Stores {
    Stores::connect("sqlite::memory:").await.expect("in-memory stores")
}

#[tokio::test]
async fn save_and_fetch_by_id() {
    let stores = test_stores().await;
    let saved = stores
        .messages
        .save("c1", SenderRole::User, "looking for a laptop")
        .await
        .unwrap();

    let fetched = stores.messages.get(&saved.id).await.unwrap().unwrap();
    assert_eq!(fetched.content, "looking for a laptop");
    assert_eq!(fetched.sender_role(), SenderRole::User);
    assert_eq!(fetched.conversation_id, "c1");
}

#[tokio::test]
async fn history_keeps_send_order_within_one_turn() {
    let stores = test_stores().await;
    stores.messages.save("c1", SenderRole::User, "q1").await.unwrap();
    stores.messages.save("c1", SenderRole::Assistant, "a1").await.unwrap();
    stores.messages.save("c1", SenderRole::User, "q2").await.unwrap();
    stores.messages.save("c2", SenderRole::User, "other").await.unwrap();

    let history = stores.messages.history("c1").await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["q1", "a1", "q2"]);
}
