//! Request handlers and wire types
//!
//! The response types reduce the owner to a bare `user_id`; the full
//! user record is never serialized. Request bodies have no owner field
//! at all, so a caller-supplied owner cannot survive deserialization.

pub mod groups;
pub mod tasks;

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskboard_db::{Task, TaskGroup};

use crate::error::ApiError;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Upper bound on the page size a caller may request
pub const MAX_PAGE_SIZE: u64 = 200;

/// Pagination window parsed from `limit`/`offset` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: u64,
    pub offset: u64,
}

impl PageParams {
    /// Parse the pagination window from the raw query parameters.
    ///
    /// Absent parameters use the defaults; unparseable values are a
    /// validation error. The limit is capped at [`MAX_PAGE_SIZE`].
    pub fn from_query(raw: &HashMap<String, String>) -> Result<Self, ApiError> {
        let limit = match raw.get("limit") {
            Some(value) => value.parse::<u64>().map_err(|_| {
                ApiError::Validation(format!("Invalid limit value: '{}'", value))
            })?,
            None => DEFAULT_PAGE_SIZE,
        };
        let offset = match raw.get("offset") {
            Some(value) => value.parse::<u64>().map_err(|_| {
                ApiError::Validation(format!("Invalid offset value: '{}'", value))
            })?,
            None => 0,
        };

        Ok(Self {
            limit: limit.min(MAX_PAGE_SIZE),
            offset,
        })
    }
}

/// Paginated list envelope: total match count plus one page of results.
#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
    pub count: u64,
    pub results: Vec<T>,
}

/// A task group as serialized in responses.
#[derive(Debug, Serialize)]
pub struct TaskGroupResponse {
    pub id: String,
    pub name: String,
    pub user_id: i64,
}

impl From<TaskGroup> for TaskGroupResponse {
    fn from(group: TaskGroup) -> Self {
        Self {
            id: group.record_id().unwrap_or_default(),
            user_id: group.owner.0,
            name: group.name,
        }
    }
}

/// A task as serialized in responses, with its group depth-expanded.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub group: Option<TaskGroupResponse>,
    pub user_id: i64,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.record_id().unwrap_or_default(),
            user_id: task.owner.0,
            name: task.name,
            description: task.description,
            due_date: task.due_date,
            created_at: task.created_at,
            finished_at: task.finished_at,
            group: task.group.map(TaskGroupResponse::from),
        }
    }
}

/// Request body for creating or fully replacing a task.
///
/// Unknown fields (including any attempt at `user_id`) are ignored.
#[derive(Debug, Deserialize)]
pub struct TaskBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub group: Option<String>,
}

/// Request body for partially updating a task.
///
/// Absent fields are left unchanged; clearing a field is done through a
/// full PUT.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPatchBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub finished_at: Option<DateTime<Utc>>,
    pub group: Option<String>,
}

/// Request body for creating, replacing, or renaming a task group.
#[derive(Debug, Deserialize)]
pub struct TaskGroupBody {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_db::UserId;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::from_query(&HashMap::new()).unwrap();
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn test_page_params_explicit() {
        let params = PageParams::from_query(&raw(&[("limit", "10"), ("offset", "30")])).unwrap();
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 30);
    }

    #[test]
    fn test_page_params_limit_is_capped() {
        let params = PageParams::from_query(&raw(&[("limit", "100000")])).unwrap();
        assert_eq!(params.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_params_invalid_values_rejected() {
        assert!(PageParams::from_query(&raw(&[("limit", "lots")])).is_err());
        assert!(PageParams::from_query(&raw(&[("offset", "-3")])).is_err());
    }

    #[test]
    fn test_task_response_reduces_owner_to_user_id() {
        let task = Task {
            id: None,
            name: "Serialize me".to_string(),
            description: None,
            due_date: None,
            created_at: None,
            finished_at: None,
            group: None,
            owner: UserId(7),
        };

        let json = serde_json::to_value(TaskResponse::from(task)).unwrap();
        assert_eq!(json["user_id"], 7);
        assert!(json.get("owner").is_none(), "owner must not be serialized");
        // Nullable fields are present as explicit nulls
        assert!(json["description"].is_null());
        assert!(json["finished_at"].is_null());
    }

    #[test]
    fn test_task_body_ignores_user_id_field() {
        let body: TaskBody = serde_json::from_value(serde_json::json!({
            "name": "Sneaky",
            "user_id": 999,
        }))
        .unwrap();
        assert_eq!(body.name, "Sneaky");
        // No owner field exists on the body type to smuggle a value into
    }

    #[test]
    fn test_task_patch_body_defaults_to_empty() {
        let body: TaskPatchBody = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(body.name.is_none());
        assert!(body.description.is_none());
        assert!(body.group.is_none());
    }
}
