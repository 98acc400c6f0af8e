//! Task group repository for owner-scoped CRUD operations
//!
//! Groups link related tasks together. Like tasks, every operation is
//! bound to the authenticated owner at construction. Deleting a group
//! is an owning cascade: its member tasks go with it.

use crate::error::{DbError, DbResult};
use crate::models::{TaskGroup, UserId};
use crate::repository::query::SelectQuery;
use serde::Deserialize;
use serde_json::Value;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, trace};

/// Default ordering for group listings: newest first, then by name and
/// owner.
pub const GROUP_ORDER: &str = "id DESC, name, owner";

/// Payload for creating a task group.
///
/// As with tasks, there is no owner field: the repository injects its
/// own owner when building the record.
#[derive(Debug, Clone, Default)]
pub struct NewTaskGroup {
    /// Group name
    pub name: String,
}

impl NewTaskGroup {
    /// Create a new group payload with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Update structure for task groups; only the name can change.
#[derive(Debug, Clone, Default)]
pub struct TaskGroupPatch {
    /// New name (if Some)
    pub name: Option<String>,
}

impl TaskGroupPatch {
    /// Create a new empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check if any updates are specified
    pub fn has_updates(&self) -> bool {
        self.name.is_some()
    }
}

/// One page of an owner-scoped group listing.
#[derive(Debug)]
pub struct TaskGroupPage {
    /// Total number of groups owned by the caller
    pub total: u64,
    /// The requested page, in default ordering
    pub groups: Vec<TaskGroup>,
}

/// Minimal row for id-only results
#[derive(Debug, Deserialize)]
struct IdOnly {
    id: surrealdb::sql::Thing,
}

/// Row shape of a count statement
#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

/// Repository for task group CRUD operations, scoped to a single owner.
pub struct GroupRepository<'a> {
    client: &'a Surreal<Db>,
    owner: UserId,
}

impl<'a> GroupRepository<'a> {
    /// Create a repository acting on behalf of `owner`.
    pub fn new(client: &'a Surreal<Db>, owner: UserId) -> Self {
        Self { client, owner }
    }

    /// Base query over the task_group table, restricted to this owner.
    fn scoped(&self) -> SelectQuery {
        let mut query = SelectQuery::table("task_group");
        let placeholder = query.push_binding(self.owner.0);
        query.push_condition(format!("owner = {}", placeholder));
        query
    }

    /// Execute a statement with the given bindings.
    async fn run(
        &self,
        sql: String,
        bindings: Vec<(String, Value)>,
    ) -> DbResult<surrealdb::Response> {
        trace!("Executing: {}", sql);
        let mut request = self.client.query(sql);
        for (name, value) in bindings {
            request = request.bind((name, value));
        }
        Ok(request.await?)
    }

    /// List this owner's groups with the total count.
    pub async fn list(&self, limit: u64, start: u64) -> DbResult<TaskGroupPage> {
        let query = self.scoped();

        let count_sql = query.count_statement();
        let page = query.with_order(GROUP_ORDER).with_limit(limit).with_start(start);
        let select_sql = page.statement("*");

        let sql = format!("{};\n{}", count_sql, select_sql);
        let mut response = self.run(sql, page.into_bindings()).await?;

        let count: Option<CountRow> = response.take(0)?;
        let groups: Vec<TaskGroup> = response.take(1)?;

        Ok(TaskGroupPage {
            total: count.map(|row| row.count).unwrap_or(0),
            groups,
        })
    }

    /// Get one of this owner's groups by id.
    ///
    /// Returns `None` for unknown ids and for groups owned by other
    /// users.
    pub async fn get(&self, id: &str) -> DbResult<Option<TaskGroup>> {
        debug!("Fetching task_group {} for owner {}", id, self.owner);
        let mut query = self.scoped();
        let placeholder = query.push_binding(id);
        query.push_condition(format!("id = type::thing('task_group', {})", placeholder));

        let sql = query.statement("*");
        let mut response = self.run(sql, query.into_bindings()).await?;
        let group: Option<TaskGroup> = response.take(0)?;
        Ok(group)
    }

    /// Create a group owned by this repository's owner.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` when (name, owner) collides with an
    /// existing group.
    pub async fn create(&self, group: &NewTaskGroup) -> DbResult<TaskGroup> {
        debug!("Creating task_group '{}' for owner {}", group.name, self.owner);

        let sql = "CREATE task_group:ulid() CONTENT { name: $name, owner: $owner }".to_string();
        let bindings = vec![
            ("name".to_string(), Value::from(group.name.clone())),
            ("owner".to_string(), Value::from(self.owner.0)),
        ];
        let mut response = self.run(sql, bindings).await?;
        let created: Option<TaskGroup> = response
            .take(0)
            .map_err(super::task::classify_write_error)?;

        created.ok_or_else(|| DbError::Validation {
            message: format!("Task group '{}' could not be created", group.name),
        })
    }

    /// Apply a partial update to one of this owner's groups.
    ///
    /// Returns the updated group, or `None` when the id does not
    /// resolve within the owner's scope.
    pub async fn update(&self, id: &str, patch: &TaskGroupPatch) -> DbResult<Option<TaskGroup>> {
        if !patch.has_updates() {
            return self.get(id).await;
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut bindings: Vec<(String, Value)> = vec![
            ("id".to_string(), Value::from(id)),
            ("owner".to_string(), Value::from(self.owner.0)),
        ];

        if let Some(name) = &patch.name {
            assignments.push("name = $name".to_string());
            bindings.push(("name".to_string(), Value::from(name.clone())));
        }

        let sql = format!(
            "UPDATE task_group SET {} \
             WHERE id = type::thing('task_group', $id) AND owner = $owner",
            assignments.join(", ")
        );
        let mut response = self.run(sql, bindings).await?;
        let updated: Option<TaskGroup> = response
            .take(0)
            .map_err(super::task::classify_write_error)?;
        Ok(updated)
    }

    /// Delete one of this owner's groups along with its member tasks.
    ///
    /// The group owns its tasks, so removal cascades; both deletes run
    /// in a single transaction. Returns whether the group existed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!("Deleting task_group {} for owner {}", id, self.owner);
        let sql = "BEGIN TRANSACTION; \
                   DELETE task \
                       WHERE `group` = type::thing('task_group', $id) AND owner = $owner; \
                   DELETE task_group \
                       WHERE id = type::thing('task_group', $id) AND owner = $owner \
                       RETURN BEFORE; \
                   COMMIT TRANSACTION;"
            .to_string();
        let bindings = vec![
            ("id".to_string(), Value::from(id)),
            ("owner".to_string(), Value::from(self.owner.0)),
        ];
        let mut response = self.run(sql, bindings).await?;
        let deleted: Vec<IdOnly> = response.take(1)?;
        Ok(!deleted.is_empty())
    }
}
