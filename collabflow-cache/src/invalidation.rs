//! Mutation-to-eviction mapping.
//!
//! Every successful mutation evicts its mapped keys before the response is
//! returned. Eviction is delete-based: the next read repopulates the entry.
//! Filtered task listing keys are deliberately not enumerated; they age out
//! within their TTL.

use crate::keys::{project_listing_key, task_listing_key, workspace_listing_key, TaskFilter};
use crate::traits::CacheBackend;
use tracing::warn;

/// A committed mutation, as seen by the invalidation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// A workspace was created, updated, or deleted.
    WorkspaceChanged,

    /// A workspace invite was recorded (embedded in workspace listings).
    InviteCreated,

    /// A project in the given workspace was created, updated, or deleted.
    ProjectChanged { workspace_id: i64 },

    /// A task in the given project was created, updated, status-changed,
    /// or deleted.
    TaskChanged { project_id: i64 },
}

impl Mutation {
    /// Keys this mutation evicts.
    pub fn evicted_keys(&self) -> Vec<String> {
        match self {
            Mutation::WorkspaceChanged | Mutation::InviteCreated => {
                vec![workspace_listing_key().to_string()]
            }
            Mutation::ProjectChanged { workspace_id } => {
                vec![project_listing_key(*workspace_id)]
            }
            Mutation::TaskChanged { project_id } => {
                vec![task_listing_key(&TaskFilter::for_project(*project_id))]
            }
        }
    }
}

/// Evict the keys mapped to `mutation`.
///
/// Runs synchronously on the mutation path, before the response is built.
/// Backend failures are logged and swallowed: the stale entry then ages
/// out via TTL instead.
pub async fn invalidate<C: CacheBackend>(backend: &C, mutation: Mutation) {
    for key in mutation.evicted_keys() {
        if let Err(e) = backend.delete(&key).await {
            warn!(key = %key, error = %e, "Cache eviction failed, entry will expire via TTL");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCache;
    use std::time::Duration;

    #[test]
    fn test_workspace_mutations_evict_workspace_listing() {
        assert_eq!(Mutation::WorkspaceChanged.evicted_keys(), vec!["workspaces:all"]);
        assert_eq!(Mutation::InviteCreated.evicted_keys(), vec!["workspaces:all"]);
    }

    #[test]
    fn test_project_mutation_evicts_exactly_its_workspace_key() {
        let keys = Mutation::ProjectChanged { workspace_id: 5 }.evicted_keys();
        assert_eq!(keys, vec!["projects_workspace_5"]);
    }

    #[test]
    fn test_task_mutation_evicts_all_filters_key_only() {
        let keys = Mutation::TaskChanged { project_id: 3 }.evicted_keys();
        assert_eq!(keys, vec!["tasks_cache_3_all_all"]);
    }

    #[tokio::test]
    async fn test_invalidate_removes_populated_entry() {
        let cache = MemoryCache::new();
        cache
            .set("projects_workspace_5", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("projects_workspace_6", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        invalidate(&cache, Mutation::ProjectChanged { workspace_id: 5 }).await;

        assert_eq!(cache.get("projects_workspace_5").await.unwrap(), None);
        // Other workspaces untouched.
        assert!(cache.get("projects_workspace_6").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_never_populated_key_is_noop() {
        let cache = MemoryCache::new();
        invalidate(&cache, Mutation::TaskChanged { project_id: 99 }).await;
        assert_eq!(cache.get("tasks_cache_99_all_all").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filtered_task_keys_survive_task_mutation() {
        let cache = MemoryCache::new();
        cache
            .set("tasks_cache_3_all_all", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set(
                "tasks_cache_3_High_all",
                "[]".to_string(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        invalidate(&cache, Mutation::TaskChanged { project_id: 3 }).await;

        assert_eq!(cache.get("tasks_cache_3_all_all").await.unwrap(), None);
        // Accepted staleness window: filtered permutations expire by TTL.
        assert!(cache.get("tasks_cache_3_High_all").await.unwrap().is_some());
    }
}
