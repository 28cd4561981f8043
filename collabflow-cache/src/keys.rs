//! Listing cache key derivation and TTL policy.
//!
//! Keys are pure functions of the effective filter set, so requests that
//! differ only in parameter order or encoding share an entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL for filtered task listings.
pub const TASK_LISTING_TTL: Duration = Duration::from_secs(60);

/// TTL for per-workspace project listings.
pub const PROJECT_LISTING_TTL: Duration = Duration::from_secs(60);

/// TTL for the workspace listing.
pub const WORKSPACE_LISTING_TTL: Duration = Duration::from_secs(3600);

/// Effective filter set for a task listing request.
///
/// Absent filters contribute the literal `all` to the derived key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub project_id: Option<i64>,
    pub priority: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl TaskFilter {
    /// Filter scoped to a single project with no further narrowing.
    pub fn for_project(project_id: i64) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }
}

/// Derive the cache key for a task listing.
///
/// Format: `tasks_cache_{project|all}_{priority|all}_{due|all}`.
pub fn task_listing_key(filter: &TaskFilter) -> String {
    let project = filter
        .project_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "all".to_string());
    let priority = filter.priority.clone().unwrap_or_else(|| "all".to_string());
    let due = filter
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "all".to_string());
    format!("tasks_cache_{}_{}_{}", project, priority, due)
}

/// Derive the cache key for a workspace's project listing.
pub fn project_listing_key(workspace_id: i64) -> String {
    format!("projects_workspace_{}", workspace_id)
}

/// Cache key for the workspace listing.
pub fn workspace_listing_key() -> &'static str {
    "workspaces:all"
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_task_key_all_filters_absent() {
        assert_eq!(task_listing_key(&TaskFilter::default()), "tasks_cache_all_all_all");
    }

    #[test]
    fn test_task_key_project_only() {
        assert_eq!(
            task_listing_key(&TaskFilter::for_project(3)),
            "tasks_cache_3_all_all"
        );
    }

    #[test]
    fn test_task_key_full_filter() {
        let filter = TaskFilter {
            project_id: Some(3),
            priority: Some("High".to_string()),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        };
        assert_eq!(task_listing_key(&filter), "tasks_cache_3_High_2026-09-01");
    }

    #[test]
    fn test_project_key_embeds_workspace_id() {
        assert_eq!(project_listing_key(5), "projects_workspace_5");
    }

    #[test]
    fn test_workspace_key_is_fixed() {
        assert_eq!(workspace_listing_key(), "workspaces:all");
    }

    #[test]
    fn test_ttl_policy() {
        assert_eq!(TASK_LISTING_TTL, Duration::from_secs(60));
        assert_eq!(PROJECT_LISTING_TTL, Duration::from_secs(60));
        assert_eq!(WORKSPACE_LISTING_TTL, Duration::from_secs(3600));
    }

    proptest! {
        #[test]
        fn prop_task_key_is_deterministic(
            project in proptest::option::of(0i64..10_000),
            priority in proptest::option::of("[A-Za-z]{1,8}"),
        ) {
            let filter = TaskFilter { project_id: project, priority: priority.clone(), due_date: None };
            prop_assert_eq!(task_listing_key(&filter), task_listing_key(&filter.clone()));
        }

        #[test]
        fn prop_distinct_projects_get_distinct_keys(a in 0i64..10_000, b in 0i64..10_000) {
            prop_assume!(a != b);
            prop_assert_ne!(
                task_listing_key(&TaskFilter::for_project(a)),
                task_listing_key(&TaskFilter::for_project(b))
            );
            prop_assert_ne!(project_listing_key(a), project_listing_key(b));
        }
    }
}
