//! Database connection pool and store operations.
//!
//! PostgreSQL access goes through a deadpool-postgres pool; each store
//! operation is one method on [`DbClient`]. Mutations return the affected
//! row so handlers can invalidate and broadcast without a second query.

use crate::error::{ApiError, ApiResult};
use crate::types::{
    CreateProjectRequest, CreateTaskRequest, TaskListQuery, UpdateProjectRequest,
    UpdateTaskRequest, UpdateWorkspaceRequest, WorkspaceWithInvites,
};
use collabflow_core::{
    CommentAuthor, CommentWithAuthor, Project, Role, Task, TaskComment, User, UserSummary,
    Workspace, WorkspaceInvite,
};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use std::collections::HashMap;
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "collabflow".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("COLLABFLOW_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("COLLABFLOW_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("COLLABFLOW_DB_NAME")
                .unwrap_or_else(|_| "collabflow".to_string()),
            user: std::env::var("COLLABFLOW_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("COLLABFLOW_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("COLLABFLOW_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("COLLABFLOW_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn parse_role(raw: &str) -> Role {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(role = raw, "Unknown role in store, defaulting to Developer");
        Role::default()
    })
}

fn row_to_user(row: &Row) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: parse_role(&role),
        is_verified: row.get("is_verified"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_workspace(row: &Row) -> Workspace {
    Workspace {
        id: row.get("id"),
        name: row.get("name"),
        owner_id: row.get("owner_id"),
        branding_logo: row.get("branding_logo"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_invite(row: &Row) -> WorkspaceInvite {
    WorkspaceInvite {
        id: row.get("id"),
        email: row.get("email"),
        workspace_id: row.get("workspace_id"),
        role: row.get("role"),
        token: row.get("token"),
        accepted: row.get("accepted"),
    }
}

fn row_to_project(row: &Row) -> Project {
    Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        deadline: row.get("deadline"),
        workspace_id: row.get("workspace_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_task(row: &Row) -> Task {
    Task {
        id: row.get("id"),
        name: row.get("name"),
        status: row.get("status"),
        priority: row.get("priority"),
        labels: row.get("labels"),
        due_date: row.get("due_date"),
        assigned_to: row.get("assigned_to"),
        project_id: row.get("project_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_comment_with_author(row: &Row) -> CommentWithAuthor {
    CommentWithAuthor {
        comment: TaskComment {
            id: row.get("id"),
            content: row.get("content"),
            task_id: row.get("task_id"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        author: CommentAuthor {
            id: row.get("author_id"),
            email: row.get("author_email"),
        },
    }
}

// ============================================================================
// DATABASE CLIENT
// ============================================================================

/// Database client wrapping a connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Liveness probe: round-trip a trivial query.
    pub async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    pub async fn user_create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> ApiResult<User> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO users (name, email, password_hash, role, is_verified) \
                 VALUES ($1, $2, $3, $4, FALSE) RETURNING *",
                &[&name, &email, &password_hash, &role.as_str()],
            )
            .await?;
        Ok(row_to_user(&row))
    }

    pub async fn user_find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT * FROM users WHERE email = $1", &[&email])
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    pub async fn user_get(&self, id: i64) -> ApiResult<Option<User>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    pub async fn user_list(&self) -> ApiResult<Vec<UserSummary>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query("SELECT * FROM users ORDER BY id", &[])
            .await?;
        Ok(rows
            .iter()
            .map(|row| UserSummary::from(&row_to_user(row)))
            .collect())
    }

    pub async fn user_update_role(&self, id: i64, role: Role) -> ApiResult<Option<User>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
                &[&id, &role.as_str()],
            )
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    pub async fn user_delete(&self, id: i64) -> ApiResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // WORKSPACE OPERATIONS
    // ========================================================================

    pub async fn workspace_create(
        &self,
        name: &str,
        owner_id: i64,
        branding_logo: Option<&str>,
    ) -> ApiResult<Workspace> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO workspaces (name, owner_id, branding_logo) \
                 VALUES ($1, $2, $3) RETURNING *",
                &[&name, &owner_id, &branding_logo],
            )
            .await?;
        Ok(row_to_workspace(&row))
    }

    pub async fn workspace_get(&self, id: i64) -> ApiResult<Option<Workspace>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT * FROM workspaces WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_workspace))
    }

    /// List all workspaces with their invites embedded.
    pub async fn workspace_list_with_invites(&self) -> ApiResult<Vec<WorkspaceWithInvites>> {
        let conn = self.get_conn().await?;
        let workspace_rows = conn
            .query("SELECT * FROM workspaces ORDER BY id", &[])
            .await?;
        let invite_rows = conn
            .query("SELECT * FROM workspace_invites ORDER BY id", &[])
            .await?;

        let mut invites_by_workspace: HashMap<i64, Vec<WorkspaceInvite>> = HashMap::new();
        for row in &invite_rows {
            let invite = row_to_invite(row);
            invites_by_workspace
                .entry(invite.workspace_id)
                .or_default()
                .push(invite);
        }

        Ok(workspace_rows
            .iter()
            .map(|row| {
                let workspace = row_to_workspace(row);
                let invites = invites_by_workspace.remove(&workspace.id).unwrap_or_default();
                WorkspaceWithInvites { workspace, invites }
            })
            .collect())
    }

    pub async fn workspace_update(
        &self,
        id: i64,
        req: &UpdateWorkspaceRequest,
    ) -> ApiResult<Option<Workspace>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "UPDATE workspaces SET \
                     name = COALESCE($2, name), \
                     branding_logo = COALESCE($3, branding_logo), \
                     updated_at = NOW() \
                 WHERE id = $1 RETURNING *",
                &[&id, &req.name, &req.branding_logo],
            )
            .await?;
        Ok(row.as_ref().map(row_to_workspace))
    }

    pub async fn workspace_delete(&self, id: i64) -> ApiResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM workspaces WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }

    pub async fn invite_create(&self, email: &str, workspace_id: i64) -> ApiResult<WorkspaceInvite> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO workspace_invites (email, workspace_id, role, accepted) \
                 VALUES ($1, $2, $3, FALSE) RETURNING *",
                &[&email, &workspace_id, &WorkspaceInvite::DEFAULT_ROLE],
            )
            .await?;
        Ok(row_to_invite(&row))
    }

    // ========================================================================
    // PROJECT OPERATIONS
    // ========================================================================

    pub async fn project_create(&self, req: &CreateProjectRequest) -> ApiResult<Project> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO projects (name, description, deadline, workspace_id) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
                &[&req.name, &req.description, &req.deadline, &req.workspace_id],
            )
            .await?;
        Ok(row_to_project(&row))
    }

    pub async fn project_get(&self, id: i64) -> ApiResult<Option<Project>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT * FROM projects WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_project))
    }

    pub async fn project_list_by_workspace(&self, workspace_id: i64) -> ApiResult<Vec<Project>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT * FROM projects WHERE workspace_id = $1 ORDER BY id",
                &[&workspace_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_project).collect())
    }

    pub async fn project_update(
        &self,
        id: i64,
        req: &UpdateProjectRequest,
    ) -> ApiResult<Option<Project>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "UPDATE projects SET \
                     name = COALESCE($2, name), \
                     description = COALESCE($3, description), \
                     deadline = COALESCE($4, deadline), \
                     updated_at = NOW() \
                 WHERE id = $1 RETURNING *",
                &[&id, &req.name, &req.description, &req.deadline],
            )
            .await?;
        Ok(row.as_ref().map(row_to_project))
    }

    /// Delete a project, returning the deleted row so callers can evict the
    /// owning workspace's listing key.
    pub async fn project_delete(&self, id: i64) -> ApiResult<Option<Project>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("DELETE FROM projects WHERE id = $1 RETURNING *", &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_project))
    }

    // ========================================================================
    // TASK OPERATIONS
    // ========================================================================

    pub async fn task_create(&self, req: &CreateTaskRequest) -> ApiResult<Task> {
        let conn = self.get_conn().await?;
        let status = req.status.as_deref().unwrap_or(Task::DEFAULT_STATUS);
        let priority = req.priority.as_deref().unwrap_or(Task::DEFAULT_PRIORITY);
        let row = conn
            .query_one(
                "INSERT INTO tasks (name, status, priority, labels, due_date, assigned_to, project_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
                &[
                    &req.name,
                    &status,
                    &priority,
                    &req.labels,
                    &req.due_date,
                    &req.assigned_to,
                    &req.project_id,
                ],
            )
            .await?;
        Ok(row_to_task(&row))
    }

    pub async fn task_get(&self, id: i64) -> ApiResult<Option<Task>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT * FROM tasks WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_task))
    }

    /// List tasks matching the effective filter set.
    ///
    /// The due-date filter is a `<=` comparison; absent filters are not
    /// part of the query at all.
    pub async fn task_list(&self, filter: &TaskListQuery) -> ApiResult<Vec<Task>> {
        let conn = self.get_conn().await?;

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(ref project_id) = filter.project_id {
            params.push(project_id);
            conditions.push(format!("project_id = ${}", params.len()));
        }
        if let Some(ref priority) = filter.priority {
            params.push(priority);
            conditions.push(format!("priority = ${}", params.len()));
        }
        if let Some(ref due_date) = filter.due_date {
            params.push(due_date);
            conditions.push(format!("due_date <= ${}", params.len()));
        }

        let mut sql = String::from("SELECT * FROM tasks");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let rows = conn.query(&sql, &params).await?;
        Ok(rows.iter().map(row_to_task).collect())
    }

    pub async fn task_update(&self, id: i64, req: &UpdateTaskRequest) -> ApiResult<Option<Task>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "UPDATE tasks SET \
                     name = COALESCE($2, name), \
                     status = COALESCE($3, status), \
                     priority = COALESCE($4, priority), \
                     updated_at = NOW() \
                 WHERE id = $1 RETURNING *",
                &[&id, &req.name, &req.status, &req.priority],
            )
            .await?;
        Ok(row.as_ref().map(row_to_task))
    }

    /// Status-only transition.
    pub async fn task_set_status(&self, id: i64, status: &str) -> ApiResult<Option<Task>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
                &[&id, &status],
            )
            .await?;
        Ok(row.as_ref().map(row_to_task))
    }

    /// Delete a task, returning the deleted row so callers can evict and
    /// broadcast with the right project id.
    pub async fn task_delete(&self, id: i64) -> ApiResult<Option<Task>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("DELETE FROM tasks WHERE id = $1 RETURNING *", &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_task))
    }

    // ========================================================================
    // COMMENT OPERATIONS
    // ========================================================================

    pub async fn comment_create(
        &self,
        task_id: i64,
        user_id: i64,
        content: &str,
    ) -> ApiResult<CommentWithAuthor> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "WITH inserted AS ( \
                     INSERT INTO task_comments (content, task_id, user_id) \
                     VALUES ($1, $2, $3) RETURNING * \
                 ) \
                 SELECT inserted.*, users.id AS author_id, users.email AS author_email \
                 FROM inserted JOIN users ON users.id = inserted.user_id",
                &[&content, &task_id, &user_id],
            )
            .await?;
        Ok(row_to_comment_with_author(&row))
    }

    /// The five most recent comments on a task, newest first.
    pub async fn comment_list_recent(&self, task_id: i64) -> ApiResult<Vec<CommentWithAuthor>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT c.*, users.id AS author_id, users.email AS author_email \
                 FROM task_comments c JOIN users ON users.id = c.user_id \
                 WHERE c.task_id = $1 \
                 ORDER BY c.created_at DESC LIMIT 5",
                &[&task_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_comment_with_author).collect())
    }

    // ========================================================================
    // STATS OPERATIONS
    // ========================================================================

    pub async fn count_table(&self, table: StatsTable) -> ApiResult<i64> {
        let conn = self.get_conn().await?;
        let row = conn.query_one(table.count_sql(), &[]).await?;
        Ok(row.get(0))
    }

    /// The three most recently created projects.
    pub async fn recent_projects(&self) -> ApiResult<Vec<Project>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query("SELECT * FROM projects ORDER BY created_at DESC LIMIT 3", &[])
            .await?;
        Ok(rows.iter().map(row_to_project).collect())
    }

    /// The three most recently created tasks.
    pub async fn recent_tasks(&self) -> ApiResult<Vec<Task>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query("SELECT * FROM tasks ORDER BY created_at DESC LIMIT 3", &[])
            .await?;
        Ok(rows.iter().map(row_to_task).collect())
    }
}

/// Tables the stats endpoint counts.
///
/// Table names are fixed at compile time; nothing user-supplied reaches
/// the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsTable {
    Users,
    Tasks,
    Workspaces,
    Projects,
}

impl StatsTable {
    fn count_sql(&self) -> &'static str {
        match self {
            StatsTable::Users => "SELECT COUNT(*) FROM users",
            StatsTable::Tasks => "SELECT COUNT(*) FROM tasks",
            StatsTable::Workspaces => "SELECT COUNT(*) FROM workspaces",
            StatsTable::Projects => "SELECT COUNT(*) FROM projects",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "collabflow");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_parse_role_falls_back_to_developer() {
        assert_eq!(parse_role("Admin"), Role::Admin);
        assert_eq!(parse_role("nonsense"), Role::Developer);
    }

    #[test]
    fn test_stats_table_sql_is_fixed() {
        assert_eq!(StatsTable::Users.count_sql(), "SELECT COUNT(*) FROM users");
        assert_eq!(
            StatsTable::Projects.count_sql(),
            "SELECT COUNT(*) FROM projects"
        );
    }
}
