//! Cached listing reads and their invalidation.
//!
//! Each listing endpoint serves the serialized envelope produced by a
//! store query, via the read-through cache. Mutation handlers call
//! [`CachedListings::invalidate`] with the mutation that happened; the
//! key mapping lives in the cache crate.

use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::types::{ProjectsListing, TaskListQuery, TasksListing, WorkspacesListing};
use async_trait::async_trait;
use collabflow_cache::{
    invalidate, project_listing_key, task_listing_key, workspace_listing_key, ListingFetcher,
    MemoryCache, Mutation, ReadThroughCache, TaskFilter, PROJECT_LISTING_TTL, TASK_LISTING_TTL,
    WORKSPACE_LISTING_TTL,
};
use std::sync::Arc;

fn task_filter(query: &TaskListQuery) -> TaskFilter {
    TaskFilter {
        project_id: query.project_id,
        priority: query.priority.clone(),
        due_date: query.due_date,
    }
}

struct TaskListingFetcher<'a> {
    db: &'a DbClient,
    query: &'a TaskListQuery,
}

#[async_trait]
impl ListingFetcher for TaskListingFetcher<'_> {
    type Error = ApiError;

    async fn fetch(&self) -> ApiResult<String> {
        let tasks = self.db.task_list(self.query).await?;
        let listing = TasksListing {
            message: "Tasks retrieved successfully".to_string(),
            tasks,
        };
        Ok(serde_json::to_string(&listing)?)
    }
}

struct ProjectListingFetcher<'a> {
    db: &'a DbClient,
    workspace_id: i64,
}

#[async_trait]
impl ListingFetcher for ProjectListingFetcher<'_> {
    type Error = ApiError;

    async fn fetch(&self) -> ApiResult<String> {
        let projects = self.db.project_list_by_workspace(self.workspace_id).await?;
        let listing = ProjectsListing {
            message: "Projects retrieved successfully".to_string(),
            projects,
        };
        Ok(serde_json::to_string(&listing)?)
    }
}

struct WorkspaceListingFetcher<'a> {
    db: &'a DbClient,
}

#[async_trait]
impl ListingFetcher for WorkspaceListingFetcher<'_> {
    type Error = ApiError;

    async fn fetch(&self) -> ApiResult<String> {
        let workspaces = self.db.workspace_list_with_invites().await?;
        let listing = WorkspacesListing {
            message: "Workspaces retrieved successfully".to_string(),
            workspaces,
        };
        Ok(serde_json::to_string(&listing)?)
    }
}

/// Listing reads served through the in-process cache.
#[derive(Clone)]
pub struct CachedListings {
    db: DbClient,
    cache: ReadThroughCache<MemoryCache>,
}

impl CachedListings {
    pub fn new(db: DbClient) -> Self {
        Self {
            db,
            cache: ReadThroughCache::new(Arc::new(MemoryCache::new())),
        }
    }

    /// Serialized `{message, tasks}` envelope for the given filter set.
    pub async fn tasks(&self, query: &TaskListQuery) -> ApiResult<String> {
        let key = task_listing_key(&task_filter(query));
        let fetcher = TaskListingFetcher {
            db: &self.db,
            query,
        };
        let read = self
            .cache
            .get_or_fetch(&key, TASK_LISTING_TTL, &fetcher)
            .await?;
        Ok(read.into_payload())
    }

    /// Serialized `{message, projects}` envelope for one workspace.
    pub async fn projects(&self, workspace_id: i64) -> ApiResult<String> {
        let key = project_listing_key(workspace_id);
        let fetcher = ProjectListingFetcher {
            db: &self.db,
            workspace_id,
        };
        let read = self
            .cache
            .get_or_fetch(&key, PROJECT_LISTING_TTL, &fetcher)
            .await?;
        Ok(read.into_payload())
    }

    /// Serialized `{message, workspaces}` envelope.
    pub async fn workspaces(&self) -> ApiResult<String> {
        let fetcher = WorkspaceListingFetcher { db: &self.db };
        let read = self
            .cache
            .get_or_fetch(workspace_listing_key(), WORKSPACE_LISTING_TTL, &fetcher)
            .await?;
        Ok(read.into_payload())
    }

    /// Evict the listing keys affected by a mutation.
    ///
    /// Eviction failures are logged inside the cache crate; the mutation
    /// itself has already committed and must not be rolled back for a
    /// cache hiccup.
    pub async fn invalidate(&self, mutation: Mutation) {
        invalidate(self.cache.backend(), mutation).await;
    }
}
