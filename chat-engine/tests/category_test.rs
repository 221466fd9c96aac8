//! Category descent tests over a seeded taxonomy with a scripted
//! collaborator.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chat_engine::CategoryResolver;
use llm_client::{ChatMessage, LlmClient, LlmError};
use storage::{CategoryRepository, SqlitePoolManager, Stores};
use tokio::sync::Mutex;

struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedLlm {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.replies
            .lock()
            .await
            .pop_front()
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Seeds Electronics > Phones > Smartphones (plus siblings) and returns the
/// repository with the Smartphones leaf id.
async fn seeded_categories() -> (CategoryRepository, i64) {
    let pool_manager = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("in-memory pool");
    let stores = Stores::from_pool(pool_manager)
        .await
        .expect("init stores");
    let categories = stores.categories;

    let electronics = categories.insert("Electronics", None).await.expect("seed");
    categories.insert("Home", None).await.expect("seed");
    let phones = categories
        .insert("Phones", Some(electronics))
        .await
        .expect("seed");
    categories
        .insert("Laptops", Some(electronics))
        .await
        .expect("seed");
    let smartphones = categories
        .insert("Smartphones", Some(phones))
        .await
        .expect("seed");
    categories
        .insert("Feature Phones", Some(phones))
        .await
        .expect("seed");

    (categories, smartphones)
}

#[tokio::test]
async fn descends_one_level_at_a_time_to_a_leaf() {
    let (categories, smartphones) = seeded_categories().await;
    let llm = ScriptedLlm::new(&["Electronics", "Phones", "Smartphones"]);
    let resolver = CategoryResolver::new(categories, llm);

    let path = resolver
        .resolve_path("Pixel 9", "A compact Android phone.")
        .await
        .expect("resolve")
        .expect("path");
    assert_eq!(path, "Electronics > Phones > Smartphones");

    let id = resolver
        .resolve_category_id(&path)
        .await
        .expect("resolve id");
    assert_eq!(id, Some(smartphones));
}

#[tokio::test]
async fn reasoning_blocks_are_stripped_from_answers() {
    let (categories, _) = seeded_categories().await;
    let llm = ScriptedLlm::new(&[
        "<think>phones live under electronics</think>Electronics",
        "Phones",
        "Smartphones",
    ]);
    let resolver = CategoryResolver::new(categories, llm);

    let path = resolver
        .resolve_path("Pixel 9", "A compact Android phone.")
        .await
        .expect("resolve")
        .expect("path");
    assert_eq!(path, "Electronics > Phones > Smartphones");
}

#[tokio::test]
async fn unresolvable_answer_truncates_to_partial_path() {
    let (categories, _) = seeded_categories().await;
    // Second answer names a category that is not a child of Electronics.
    let llm = ScriptedLlm::new(&["Electronics", "Bicycles"]);
    let resolver = CategoryResolver::new(categories, llm);

    let path = resolver
        .resolve_path("Gravel Pro", "A gravel bike.")
        .await
        .expect("resolve");
    assert_eq!(path.as_deref(), Some("Electronics"));
}

#[tokio::test]
async fn failure_at_the_root_level_yields_no_path() {
    let (categories, _) = seeded_categories().await;
    let llm = ScriptedLlm::new(&["Garden"]);
    let resolver = CategoryResolver::new(categories, llm);

    let path = resolver
        .resolve_path("Rose Seeds", "A packet of seeds.")
        .await
        .expect("resolve");
    assert!(path.is_none());
}

#[tokio::test]
async fn collaborator_error_mid_walk_keeps_progress() {
    let (categories, _) = seeded_categories().await;
    // Only one scripted answer; the second level query fails.
    let llm = ScriptedLlm::new(&["Electronics"]);
    let resolver = CategoryResolver::new(categories, llm);

    let path = resolver
        .resolve_path("Pixel 9", "A compact Android phone.")
        .await
        .expect("resolve");
    assert_eq!(path.as_deref(), Some("Electronics"));
}

#[tokio::test]
async fn path_segments_tolerate_uneven_spacing() {
    let (categories, smartphones) = seeded_categories().await;
    let llm = ScriptedLlm::new(&[]);
    let resolver = CategoryResolver::new(categories, llm);

    let id = resolver
        .resolve_category_id("Electronics>  Phones >Smartphones")
        .await
        .expect("resolve id");
    assert_eq!(id, Some(smartphones));
}

#[tokio::test]
async fn full_path_memoizes_shared_ancestors() {
    let (categories, smartphones) = seeded_categories().await;
    let llm = ScriptedLlm::new(&[]);
    let resolver = CategoryResolver::new(categories.clone(), llm);

    let phones = categories
        .find("Phones", resolver.resolve_category_id("Electronics").await.expect("id"))
        .await
        .expect("query")
        .expect("phones")
        .id;

    let mut memo = HashMap::new();
    let leaf_path = resolver
        .full_path(smartphones, &mut memo)
        .await
        .expect("full path");
    assert_eq!(leaf_path, "Electronics > Phones > Smartphones");

    // Ancestors were memoized along the way.
    assert_eq!(memo.get(&phones).map(String::as_str), Some("Electronics > Phones"));

    // A second lookup answers from the memo.
    let again = resolver
        .full_path(smartphones, &mut memo)
        .await
        .expect("full path");
    assert_eq!(again, leaf_path);
}

#[tokio::test]
async fn unknown_id_resolves_to_empty_path() {
    let (categories, _) = seeded_categories().await;
    let llm = ScriptedLlm::new(&[]);
    let resolver = CategoryResolver::new(categories, llm);

    let mut memo = HashMap::new();
    let path = resolver.full_path(9999, &mut memo).await.expect("full path");
    assert!(path.is_empty());

    let by_id = resolver.path_by_id(9999).await.expect("path by id");
    assert!(by_id.is_none());
}
