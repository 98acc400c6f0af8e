//! Data models for the Taskboard TODO backend
//!
//! Defines Rust types that map to the SurrealDB schema for tasks and
//! task groups. Owners are opaque user identities issued by the external
//! authentication collaborator; only their numeric id is ever stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

/// Opaque identity of a user, as issued by the authentication layer.
///
/// Tasks and task groups reference owners by this id; the user record
/// itself is never stored or serialized by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group linking related tasks so they can be shown together,
/// for example as a single column on a board.
///
/// `(name, owner)` is unique per the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGroup {
    /// Unique identifier (SurrealDB record ID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    /// Group name
    pub name: String,

    /// Owning user
    pub owner: UserId,
}

impl TaskGroup {
    /// The bare record id (without the table prefix), if persisted.
    pub fn record_id(&self) -> Option<String> {
        self.id.as_ref().map(|thing| thing.id.to_string())
    }
}

/// A single task. A task with a non-null `finished_at` is completed.
///
/// `(name, owner, group)` is unique per the schema. On reads the `group`
/// reference is expanded into the full group record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (SurrealDB record ID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    /// Task name
    pub name: String,

    /// Optional free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional due date (date only, no time component)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Creation timestamp; the store fills it in when omitted on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Completion timestamp; non-null means the task is done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Optional group this task belongs to, expanded on reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<TaskGroup>,

    /// Owning user
    pub owner: UserId,
}

impl Task {
    /// The bare record id (without the table prefix), if persisted.
    pub fn record_id(&self) -> Option<String> {
        self.id.as_ref().map(|thing| thing.id.to_string())
    }

    /// Whether this task is completed.
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}
