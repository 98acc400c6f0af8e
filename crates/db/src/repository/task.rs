//! Task repository for owner-scoped CRUD operations
//!
//! Every repository instance is bound to the authenticated owner at
//! construction; all statements it issues carry an `owner = $owner`
//! condition, so records belonging to other users are indistinguishable
//! from records that do not exist.

use crate::datetime;
use crate::error::{DbError, DbResult};
use crate::models::{Task, UserId};
use crate::repository::filter::FilterSet;
use crate::repository::query::{QueryParams, SelectQuery};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, trace};

/// Default ordering for task listings: newest first, then by due date,
/// creation time, name, and owner.
pub const TASK_ORDER: &str = "id DESC, due_date DESC, created_at DESC, name, owner";

/// Payload for creating a task.
///
/// There is deliberately no owner field: the repository injects its own
/// owner, so a caller-supplied owner can never leak into the record.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Task name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional due date
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp; the store defaults it to "now" when omitted
    pub created_at: Option<DateTime<Utc>>,
    /// Optional group record id, resolved within the owner's scope
    pub group: Option<String>,
}

impl NewTask {
    /// Create a new task payload with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set an explicit creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set the group by record id
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Update structure for partial task updates.
///
/// The outer `Option` distinguishes "leave unchanged" from "set";
/// the inner `Option` on clearable fields distinguishes "set a value"
/// from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New name (if Some)
    pub name: Option<String>,
    /// New description; `Some(None)` clears it
    pub description: Option<Option<String>>,
    /// New due date; `Some(None)` clears it
    pub due_date: Option<Option<NaiveDate>>,
    /// New completion timestamp; `Some(None)` reopens the task
    pub finished_at: Option<Option<DateTime<Utc>>>,
    /// New group record id; `Some(None)` ungroups the task
    pub group: Option<Option<String>>,
}

impl TaskPatch {
    /// Create a new empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a new description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Clear the description
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Set a new due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    /// Clear the due date
    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    /// Set the completion timestamp directly
    pub fn with_finished_at(mut self, finished_at: DateTime<Utc>) -> Self {
        self.finished_at = Some(Some(finished_at));
        self
    }

    /// Reopen the task by clearing the completion timestamp
    pub fn clear_finished_at(mut self) -> Self {
        self.finished_at = Some(None);
        self
    }

    /// Set the group by record id
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(Some(group.into()));
        self
    }

    /// Remove the task from its group
    pub fn clear_group(mut self) -> Self {
        self.group = Some(None);
        self
    }

    /// Check if any updates are specified
    pub fn has_updates(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.due_date.is_some()
            || self.finished_at.is_some()
            || self.group.is_some()
    }
}

/// One page of an owner-scoped, filtered task listing.
#[derive(Debug)]
pub struct TaskPage {
    /// Total number of matching tasks, before pagination
    pub total: u64,
    /// The requested page, in default ordering
    pub tasks: Vec<Task>,
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

/// Classify a statement error, detecting unique-index violations.
pub(crate) fn classify_write_error(err: surrealdb::Error) -> DbError {
    let message = err.to_string();
    if message.contains("already contains") {
        DbError::Validation {
            message: "A record with these unique fields already exists".to_string(),
        }
    } else {
        DbError::Query(Box::new(err))
    }
}

/// Repository for task CRUD operations, scoped to a single owner.
pub struct TaskRepository<'a> {
    client: &'a Surreal<Db>,
    owner: UserId,
}

impl<'a> TaskRepository<'a> {
    /// Create a repository acting on behalf of `owner`.
    pub fn new(client: &'a Surreal<Db>, owner: UserId) -> Self {
        Self { client, owner }
    }

    /// Base query over the task table, restricted to this owner.
    fn scoped(&self) -> SelectQuery {
        let mut query = SelectQuery::table("task");
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

    /// List this owner's tasks, narrowed by `filters` under `params`.
    ///
    /// Returns the page requested by `limit`/`start` along with the
    /// total match count.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` for unusable filter parameter
    /// values and `DbError::Query` if the database query fails.
    pub async fn list(
        &self,
        filters: &FilterSet,
        params: &QueryParams,
        limit: u64,
        start: u64,
    ) -> DbResult<TaskPage> {
        let narrowed = filters.apply(self.scoped(), params)?;

        let count_sql = narrowed.count_statement();
        let page = narrowed
            .with_order(TASK_ORDER)
            .with_fetch("`group`")
            .with_limit(limit)
            .with_start(start);
        let select_sql = page.statement("*");

        let sql = format!("{};\n{}", count_sql, select_sql);
        let mut response = self.run(sql, page.into_bindings()).await?;

        let count: Option<CountRow> = response.take(0)?;
        let tasks: Vec<Task> = response.take(1)?;

        Ok(TaskPage {
            total: count.map(|row| row.count).unwrap_or(0),
            tasks,
        })
    }

    /// Get one of this owner's tasks by id, with its group expanded.
    ///
    /// Returns `None` for unknown ids and for tasks owned by other users.
    pub async fn get(&self, id: &str) -> DbResult<Option<Task>> {
        debug!("Fetching task {} for owner {}", id, self.owner);
        let mut query = self.scoped();
        let placeholder = query.push_binding(id);
        query.push_condition(format!("id = type::thing('task', {})", placeholder));
        let query = query.with_fetch("`group`");

        let sql = query.statement("*");
        let mut response = self.run(sql, query.into_bindings()).await?;
        let task: Option<Task> = response.take(0)?;
        Ok(task)
    }

    /// Check whether one of this owner's tasks exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let mut query = self.scoped();
        let placeholder = query.push_binding(id);
        query.push_condition(format!("id = type::thing('task', {})", placeholder));

        let sql = query.statement("id");
        let mut response = self.run(sql, query.into_bindings()).await?;
        let row: Option<IdOnly> = response.take(0)?;
        Ok(row.is_some())
    }

    /// Create a task owned by this repository's owner.
    ///
    /// The owner field always comes from the repository, never from the
    /// payload. A supplied group id must resolve within the owner's
    /// scope.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` when the group does not exist for
    /// this owner, and `DbError::Validation` when (name, owner, group)
    /// collides with an existing task.
    pub async fn create(&self, task: &NewTask) -> DbResult<Task> {
        debug!("Creating task '{}' for owner {}", task.name, self.owner);

        if let Some(group_id) = &task.group
            && !self.owned_group_exists(group_id).await?
        {
            return Err(DbError::not_found("task_group", group_id));
        }

        let mut fields = vec!["name: $name".to_string(), "owner: $owner".to_string()];
        let mut bindings: Vec<(String, Value)> = vec![
            ("name".to_string(), Value::from(task.name.clone())),
            ("owner".to_string(), Value::from(self.owner.0)),
        ];

        if let Some(description) = &task.description {
            fields.push("description: $description".to_string());
            bindings.push(("description".to_string(), Value::from(description.clone())));
        }
        if let Some(due_date) = &task.due_date {
            fields.push("due_date: $due_date".to_string());
            bindings.push(("due_date".to_string(), Value::from(due_date.to_string())));
        }
        if let Some(created_at) = &task.created_at {
            fields.push("created_at: <datetime> $created_at".to_string());
            bindings.push(("created_at".to_string(), Value::from(created_at.to_rfc3339())));
        }
        if let Some(group_id) = &task.group {
            // Backticks keep the field name from parsing as the GROUP clause
            fields.push("`group`: type::thing('task_group', $group)".to_string());
            bindings.push(("group".to_string(), Value::from(group_id.clone())));
        }

        let sql = format!("CREATE task:ulid() CONTENT {{ {} }}", fields.join(", "));
        let mut response = self.run(sql, bindings).await?;
        let created: Option<IdOnly> = response.take(0).map_err(classify_write_error)?;

        let created = created.ok_or_else(|| DbError::Validation {
            message: format!("Task '{}' could not be created", task.name),
        })?;

        // Re-read through the scoped path so the group comes back expanded
        let id = created.id.id.to_string();
        self.get(&id)
            .await?
            .ok_or_else(|| DbError::not_found("task", &id))
    }

    /// Apply a partial update to one of this owner's tasks.
    ///
    /// Returns the updated task, or `None` when the id does not resolve
    /// within the owner's scope.
    pub async fn update(&self, id: &str, patch: &TaskPatch) -> DbResult<Option<Task>> {
        if !patch.has_updates() {
            return self.get(id).await;
        }

        if let Some(Some(group_id)) = &patch.group
            && !self.owned_group_exists(group_id).await?
        {
            return Err(DbError::not_found("task_group", group_id));
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
        match &patch.description {
            Some(Some(description)) => {
                assignments.push("description = $description".to_string());
                bindings.push(("description".to_string(), Value::from(description.clone())));
            }
            Some(None) => assignments.push("description = NONE".to_string()),
            None => {}
        }
        match &patch.due_date {
            Some(Some(due_date)) => {
                assignments.push("due_date = $due_date".to_string());
                bindings.push(("due_date".to_string(), Value::from(due_date.to_string())));
            }
            Some(None) => assignments.push("due_date = NONE".to_string()),
            None => {}
        }
        match &patch.finished_at {
            Some(Some(finished_at)) => {
                assignments.push("finished_at = <datetime> $finished_at".to_string());
                bindings.push(("finished_at".to_string(), Value::from(finished_at.to_rfc3339())));
            }
            Some(None) => assignments.push("finished_at = NONE".to_string()),
            None => {}
        }
        match &patch.group {
            Some(Some(group_id)) => {
                assignments.push("`group` = type::thing('task_group', $group)".to_string());
                bindings.push(("group".to_string(), Value::from(group_id.clone())));
            }
            Some(None) => assignments.push("`group` = NONE".to_string()),
            None => {}
        }

        let sql = format!(
            "UPDATE task SET {} WHERE id = type::thing('task', $id) AND owner = $owner",
            assignments.join(", ")
        );
        let mut response = self.run(sql, bindings).await?;
        let updated: Option<IdOnly> = response.take(0).map_err(classify_write_error)?;

        if updated.is_none() {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete one of this owner's tasks.
    ///
    /// Returns whether a record was actually deleted.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!("Deleting task {} for owner {}", id, self.owner);
        let sql = "DELETE task \
                   WHERE id = type::thing('task', $id) AND owner = $owner \
                   RETURN BEFORE"
            .to_string();
        let bindings = vec![
            ("id".to_string(), Value::from(id)),
            ("owner".to_string(), Value::from(self.owner.0)),
        ];
        let mut response = self.run(sql, bindings).await?;
        let deleted: Vec<IdOnly> = response.take(0)?;
        Ok(!deleted.is_empty())
    }

    /// Mark one of this owner's tasks as completed.
    ///
    /// Sets `finished_at` to the current UTC time. Idempotent: repeated
    /// calls simply refresh the timestamp. Returns the updated task, or
    /// `None` when the id does not resolve within the owner's scope.
    pub async fn complete(&self, id: &str) -> DbResult<Option<Task>> {
        debug!("Completing task {} for owner {}", id, self.owner);
        let now = datetime::utc_now();

        let sql = "UPDATE task SET finished_at = <datetime> $now \
                   WHERE id = type::thing('task', $id) AND owner = $owner"
            .to_string();
        let bindings = vec![
            ("now".to_string(), Value::from(now.to_rfc3339())),
            ("id".to_string(), Value::from(id)),
            ("owner".to_string(), Value::from(self.owner.0)),
        ];
        let mut response = self.run(sql, bindings).await?;
        let updated: Option<IdOnly> = response.take(0)?;

        if updated.is_none() {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Check whether a group id resolves within this owner's scope.
    async fn owned_group_exists(&self, group_id: &str) -> DbResult<bool> {
        let sql = "SELECT id FROM task_group \
                   WHERE id = type::thing('task_group', $group) AND owner = $owner"
            .to_string();
        let bindings = vec![
            ("group".to_string(), Value::from(group_id)),
            ("owner".to_string(), Value::from(self.owner.0)),
        ];
        let mut response = self.run(sql, bindings).await?;
        let row: Option<IdOnly> = response.take(0)?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::filter::{CheckNoneFilter, DateFilter, TextFilter};
    use crate::repository::group::{GroupRepository, NewTaskGroup};
    use crate::test_utils::create_test_db;
    use chrono::TimeZone;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    fn task_filters() -> FilterSet {
        FilterSet::new()
            .with(DateFilter::new([("date", "created_at"), ("finished_at", "finished_at")]).unwrap())
            .with(CheckNoneFilter::new([("finished", "finished_at")]).unwrap())
            .with(TextFilter::new([("search", vec!["name", "description"])]).unwrap())
    }

    async fn list_names(repo: &TaskRepository<'_>, params: &QueryParams) -> Vec<String> {
        let page = repo.list(&task_filters(), params, 100, 0).await.unwrap();
        let mut names: Vec<String> = page.tasks.into_iter().map(|t| t.name).collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_task_builders() {
        let task = NewTask::new("Write report")
            .with_description("Quarterly numbers")
            .with_due_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .with_group("g1");

        assert_eq!(task.name, "Write report");
        assert_eq!(task.description.as_deref(), Some("Quarterly numbers"));
        assert_eq!(task.group.as_deref(), Some("g1"));
        assert!(task.created_at.is_none());
    }

    #[test]
    fn test_task_patch_has_updates() {
        assert!(!TaskPatch::new().has_updates());
        assert!(TaskPatch::new().with_name("x").has_updates());
        assert!(TaskPatch::new().clear_description().has_updates());
        assert!(TaskPatch::new().clear_finished_at().has_updates());
        assert!(TaskPatch::new().clear_group().has_updates());
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let created = repo
            .create(
                &NewTask::new("Write report")
                    .with_description("Quarterly numbers")
                    .with_due_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            )
            .await
            .unwrap();

        assert_eq!(created.name, "Write report");
        assert_eq!(created.owner, ALICE);
        assert!(created.created_at.is_some(), "created_at should default");
        assert!(created.finished_at.is_none());

        let id = created.record_id().unwrap();
        let fetched = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Write report");
        assert_eq!(fetched.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[tokio::test]
    async fn test_create_with_explicit_created_at() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let moment = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let created = repo
            .create(&NewTask::new("Backdated").with_created_at(moment))
            .await
            .unwrap();

        assert_eq!(created.created_at, Some(moment));
    }

    #[tokio::test]
    async fn test_create_always_injects_repository_owner() {
        let client = create_test_db().await.unwrap();

        // Both users create a task with the same name; each record
        // carries its creator, and neither can see the other's.
        let alice_task = TaskRepository::new(&client, ALICE)
            .create(&NewTask::new("Same name"))
            .await
            .unwrap();
        let bob_task = TaskRepository::new(&client, BOB)
            .create(&NewTask::new("Same name"))
            .await
            .unwrap();

        assert_eq!(alice_task.owner, ALICE);
        assert_eq!(bob_task.owner, BOB);

        let alice_names = list_names(&TaskRepository::new(&client, ALICE), &QueryParams::new()).await;
        assert_eq!(alice_names, ["Same name"]);

        let bob_repo = TaskRepository::new(&client, BOB);
        let page = bob_repo
            .list(&task_filters(), &QueryParams::new(), 100, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.tasks[0].record_id(), bob_task.record_id());
    }

    #[tokio::test]
    async fn test_duplicate_name_owner_group_is_validation_error() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        repo.create(&NewTask::new("Dup")).await.unwrap();
        let result = repo.create(&NewTask::new("Dup")).await;
        assert!(matches!(result, Err(DbError::Validation { .. })));

        // Same name in a different group is allowed
        let groups = GroupRepository::new(&client, ALICE);
        let group = groups.create(&NewTaskGroup::new("Inbox")).await.unwrap();
        let result = repo
            .create(&NewTask::new("Dup").with_group(group.record_id().unwrap()))
            .await;
        assert!(result.is_ok(), "Distinct group should allow the name: {:?}", result.err());
    }

    #[tokio::test]
    async fn test_get_does_not_cross_owners() {
        let client = create_test_db().await.unwrap();

        let alice_task = TaskRepository::new(&client, ALICE)
            .create(&NewTask::new("Private"))
            .await
            .unwrap();
        let id = alice_task.record_id().unwrap();

        let bob_repo = TaskRepository::new(&client, BOB);
        assert!(bob_repo.get(&id).await.unwrap().is_none());
        assert!(!bob_repo.exists(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_with_group_expands_group_on_read() {
        let client = create_test_db().await.unwrap();
        let groups = GroupRepository::new(&client, ALICE);
        let group = groups.create(&NewTaskGroup::new("Inbox")).await.unwrap();

        let repo = TaskRepository::new(&client, ALICE);
        let created = repo
            .create(&NewTask::new("Grouped").with_group(group.record_id().unwrap()))
            .await
            .unwrap();

        let nested = created.group.expect("group should be expanded");
        assert_eq!(nested.name, "Inbox");
        assert_eq!(nested.owner, ALICE);
    }

    #[tokio::test]
    async fn test_create_with_foreign_group_is_not_found() {
        let client = create_test_db().await.unwrap();

        // Bob owns the group; Alice tries to attach a task to it
        let bob_group = GroupRepository::new(&client, BOB)
            .create(&NewTaskGroup::new("Bob's"))
            .await
            .unwrap();

        let result = TaskRepository::new(&client, ALICE)
            .create(&NewTask::new("Sneaky").with_group(bob_group.record_id().unwrap()))
            .await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_fields_and_clears() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let created = repo
            .create(&NewTask::new("Original").with_description("Before"))
            .await
            .unwrap();
        let id = created.record_id().unwrap();

        let updated = repo
            .update(
                &id,
                &TaskPatch::new()
                    .with_name("Renamed")
                    .clear_description()
                    .with_due_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description, None);
        assert_eq!(updated.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[tokio::test]
    async fn test_update_empty_patch_returns_current() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let created = repo.create(&NewTask::new("Unchanged")).await.unwrap();
        let id = created.record_id().unwrap();

        let result = repo.update(&id, &TaskPatch::new()).await.unwrap().unwrap();
        assert_eq!(result.name, "Unchanged");
    }

    #[tokio::test]
    async fn test_update_does_not_cross_owners() {
        let client = create_test_db().await.unwrap();

        let alice_task = TaskRepository::new(&client, ALICE)
            .create(&NewTask::new("Private"))
            .await
            .unwrap();
        let id = alice_task.record_id().unwrap();

        let result = TaskRepository::new(&client, BOB)
            .update(&id, &TaskPatch::new().with_name("Hijacked"))
            .await
            .unwrap();
        assert!(result.is_none());

        // The record is untouched
        let fetched = TaskRepository::new(&client, ALICE).get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Private");
    }

    #[tokio::test]
    async fn test_update_finished_at_directly() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let created = repo.create(&NewTask::new("Toggle")).await.unwrap();
        let id = created.record_id().unwrap();

        let moment = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let updated = repo
            .update(&id, &TaskPatch::new().with_finished_at(moment))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.finished_at, Some(moment));

        let reopened = repo
            .update(&id, &TaskPatch::new().clear_finished_at())
            .await
            .unwrap()
            .unwrap();
        assert!(reopened.finished_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_and_existence() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let created = repo.create(&NewTask::new("Ephemeral")).await.unwrap();
        let id = created.record_id().unwrap();
        assert!(repo.exists(&id).await.unwrap());

        assert!(repo.delete(&id).await.unwrap());
        assert!(!repo.exists(&id).await.unwrap());
        assert!(repo.get(&id).await.unwrap().is_none());

        // Deleting again reports nothing deleted
        assert!(!repo.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_does_not_cross_owners() {
        let client = create_test_db().await.unwrap();

        let alice_task = TaskRepository::new(&client, ALICE)
            .create(&NewTask::new("Protected"))
            .await
            .unwrap();
        let id = alice_task.record_id().unwrap();

        assert!(!TaskRepository::new(&client, BOB).delete(&id).await.unwrap());
        assert!(TaskRepository::new(&client, ALICE).exists(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_complete_sets_and_refreshes_timestamp() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let created = repo.create(&NewTask::new("Finish me")).await.unwrap();
        let id = created.record_id().unwrap();

        let before = datetime::utc_now();
        let completed = repo.complete(&id).await.unwrap().unwrap();
        let first = completed.finished_at.expect("finished_at should be set");
        assert!(first >= before - chrono::Duration::seconds(1));

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        // Completing again refreshes rather than duplicates
        let completed_again = repo.complete(&id).await.unwrap().unwrap();
        let second = completed_again.finished_at.unwrap();
        assert!(second >= first);
    }

    #[tokio::test]
    async fn test_complete_unknown_or_foreign_task_is_none() {
        let client = create_test_db().await.unwrap();

        let alice_task = TaskRepository::new(&client, ALICE)
            .create(&NewTask::new("Mine"))
            .await
            .unwrap();
        let id = alice_task.record_id().unwrap();

        let bob_repo = TaskRepository::new(&client, BOB);
        assert!(bob_repo.complete(&id).await.unwrap().is_none());
        assert!(bob_repo.complete("does-not-exist").await.unwrap().is_none());

        // Alice's task is still unfinished
        let fetched = TaskRepository::new(&client, ALICE).get(&id).await.unwrap().unwrap();
        assert!(fetched.finished_at.is_none());
    }

    #[tokio::test]
    async fn test_list_applies_filters_within_owner_scope() {
        let client = create_test_db().await.unwrap();
        let alice = TaskRepository::new(&client, ALICE);
        let bob = TaskRepository::new(&client, BOB);

        alice
            .create(&NewTask::new("Test task").with_description("alpha"))
            .await
            .unwrap();
        alice.create(&NewTask::new("Other task")).await.unwrap();
        alice.create(&NewTask::new("HIDDEN")).await.unwrap();
        bob.create(&NewTask::new("Bob task")).await.unwrap();

        let names = list_names(&alice, &[("search", "task")].into_iter().collect()).await;
        assert_eq!(names, ["Other task", "Test task"]);
    }

    #[tokio::test]
    async fn test_list_finished_filter() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let open = repo.create(&NewTask::new("Open")).await.unwrap();
        let done = repo.create(&NewTask::new("Done")).await.unwrap();
        repo.complete(&done.record_id().unwrap()).await.unwrap();

        let finished = list_names(&repo, &[("finished", "true")].into_iter().collect()).await;
        assert_eq!(finished, ["Done"]);

        let unfinished = list_names(&repo, &[("finished", "false")].into_iter().collect()).await;
        assert_eq!(unfinished, ["Open"]);

        let _ = open;
    }

    #[tokio::test]
    async fn test_list_pagination_and_count() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        for i in 0..5 {
            repo.create(&NewTask::new(format!("Task {}", i))).await.unwrap();
        }

        let page = repo
            .list(&task_filters(), &QueryParams::new(), 2, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.tasks.len(), 2);

        let rest = repo
            .list(&task_filters(), &QueryParams::new(), 100, 4)
            .await
            .unwrap();
        assert_eq!(rest.total, 5);
        assert_eq!(rest.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        repo.create(&NewTask::new("First")).await.unwrap();
        repo.create(&NewTask::new("Second")).await.unwrap();
        repo.create(&NewTask::new("Third")).await.unwrap();

        let page = repo
            .list(&task_filters(), &QueryParams::new(), 100, 0)
            .await
            .unwrap();
        let names: Vec<&str> = page.tasks.iter().map(|t| t.name.as_str()).collect();

        // ULID record ids sort by creation time, so id DESC is newest first
        assert_eq!(names, ["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_list_empty_database() {
        let client = create_test_db().await.unwrap();
        let repo = TaskRepository::new(&client, ALICE);

        let page = repo
            .list(&task_filters(), &QueryParams::new(), 100, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.tasks.is_empty());
    }
}
