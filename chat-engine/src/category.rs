//! Category path resolution by iterative tree descent.
//!
//! Instead of flattening the whole taxonomy into one prompt, the resolver
//! asks the collaborator one question per tree level, each over that level's
//! bounded option set. Path discovery produces a `" > "`-joined string; a
//! separate deterministic walk resolves the string to a category id, so path
//! strings stay the stable interchange format between the two steps.

use std::collections::HashMap;
use std::sync::Arc;

use llm_client::{ChatMessage, LlmClient};
use storage::CategoryRepository;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::parser::strip_reasoning;
use crate::prompts::{category_system_prompt, CATEGORY_USER_PROMPT};

/// Separator used in path strings: "Electronics > Phones > Smartphones".
pub const PATH_SEPARATOR: &str = " > ";

#[derive(Clone)]
pub struct CategoryResolver {
    categories: CategoryRepository,
    llm: Arc<dyn LlmClient>,
}

impl CategoryResolver {
    pub fn new(categories: CategoryRepository, llm: Arc<dyn LlmClient>) -> Self {
        Self { categories, llm }
    }

    /// Walks the taxonomy level by level, asking the collaborator to pick one
    /// option per level. Any collaborator error or unresolvable answer
    /// truncates the walk at the last resolved level; a partial path is
    /// acceptable. Returns `None` only when the root level already fails.
    pub async fn resolve_path(
        &self,
        product_name: &str,
        product_description: &str,
    ) -> Result<Option<String>, EngineError> {
        let mut level = self.categories.roots().await?;
        let mut parent_id: Option<i64> = None;
        let mut path: Vec<String> = Vec::new();

        while !level.is_empty() {
            let options: Vec<String> = level.iter().map(|c| c.name.clone()).collect();
            let prompt = category_system_prompt(product_name, product_description, &options);

            let answer = match self
                .llm
                .complete(vec![
                    ChatMessage::system(prompt),
                    ChatMessage::user(CATEGORY_USER_PROMPT),
                ])
                .await
            {
                Ok(raw) => strip_reasoning(&raw),
                Err(err) => {
                    warn!(
                        error = %err,
                        depth = path.len() + 1,
                        "Category selection failed; truncating walk"
                    );
                    break;
                }
            };

            match self.categories.find(&answer, parent_id).await? {
                Some(category) => {
                    path.push(category.name.clone());
                    parent_id = Some(category.id);
                    level = self.categories.children(category.id).await?;
                }
                None => {
                    warn!(answer = %answer, depth = path.len() + 1, "Chosen category not found at level");
                    break;
                }
            }
        }

        if path.is_empty() {
            warn!(product_name, "No category path could be determined");
            Ok(None)
        } else {
            let full_path = path.join(PATH_SEPARATOR);
            info!(product_name, path = %full_path, "Category path resolved");
            Ok(Some(full_path))
        }
    }

    /// Deterministically re-resolves a path string to its final category id
    /// with the same parent-scoped name lookup. `None` when any segment
    /// fails to resolve.
    pub async fn resolve_category_id(&self, path: &str) -> Result<Option<i64>, EngineError> {
        let mut parent_id: Option<i64> = None;
        for part in path.split('>').map(str::trim).filter(|p| !p.is_empty()) {
            match self.categories.find(part, parent_id).await? {
                Some(category) => parent_id = Some(category.id),
                None => {
                    warn!(segment = %part, "Category path segment not found");
                    return Ok(None);
                }
            }
        }
        Ok(parent_id)
    }

    /// Root-to-node path string for a known category id, or `None` for an
    /// unknown id.
    pub async fn path_by_id(&self, category_id: i64) -> Result<Option<String>, EngineError> {
        let mut names: Vec<String> = Vec::new();
        let mut cursor = Some(category_id);
        while let Some(id) = cursor {
            match self.categories.get(id).await? {
                Some(category) => {
                    names.push(category.name);
                    cursor = category.parent_id;
                }
                None => break,
            }
        }
        if names.is_empty() {
            return Ok(None);
        }
        names.reverse();
        Ok(Some(names.join(PATH_SEPARATOR)))
    }

    /// Like [`path_by_id`] but memoized through a caller-owned table, for
    /// callers resolving many ids in one request. The memo is scoped to that
    /// request and never shared implicitly.
    ///
    /// [`path_by_id`]: CategoryResolver::path_by_id
    pub async fn full_path(
        &self,
        category_id: i64,
        memo: &mut HashMap<i64, String>,
    ) -> Result<String, EngineError> {
        if let Some(hit) = memo.get(&category_id) {
            return Ok(hit.clone());
        }

        // Walk up until the root or a memoized ancestor.
        let mut chain: Vec<(i64, String)> = Vec::new();
        let mut base = String::new();
        let mut cursor = Some(category_id);
        while let Some(id) = cursor {
            if let Some(hit) = memo.get(&id) {
                base = hit.clone();
                break;
            }
            match self.categories.get(id).await? {
                Some(category) => {
                    chain.push((id, category.name));
                    cursor = category.parent_id;
                }
                None => break,
            }
        }

        // Rebuild downward, memoizing every node on the way.
        let mut path = base;
        for (id, name) in chain.into_iter().rev() {
            path = if path.is_empty() {
                name
            } else {
                format!("{}{}{}", path, PATH_SEPARATOR, name)
            };
            memo.insert(id, path.clone());
        }
        Ok(path)
    }
}
