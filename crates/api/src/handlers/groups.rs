//! Task group endpoints: owner-scoped CRUD.
//!
//! Deleting a group cascades to its member tasks; the repository owns
//! that behavior.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use taskboard_db::{GroupRepository, NewTaskGroup, TaskGroupPatch};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::{ListEnvelope, PageParams, TaskGroupBody, TaskGroupResponse};

/// `GET /task-groups` — list the caller's groups, paginated.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ListEnvelope<TaskGroupResponse>>, ApiError> {
    let page_params = PageParams::from_query(&raw)?;

    let repo = GroupRepository::new(state.db.client(), user.id());
    let page = repo.list(page_params.limit, page_params.offset).await?;

    Ok(Json(ListEnvelope {
        count: page.total,
        results: page
            .groups
            .into_iter()
            .map(TaskGroupResponse::from)
            .collect(),
    }))
}

/// `POST /task-groups` — create a group owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<TaskGroupBody>,
) -> Result<(StatusCode, Json<TaskGroupResponse>), ApiError> {
    let repo = GroupRepository::new(state.db.client(), user.id());
    let created = repo.create(&NewTaskGroup::new(body.name)).await?;
    Ok((StatusCode::CREATED, Json(TaskGroupResponse::from(created))))
}

/// `GET /task-groups/{id}` — fetch one of the caller's groups.
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<TaskGroupResponse>, ApiError> {
    let repo = GroupRepository::new(state.db.client(), user.id());
    let group = repo
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("task_group", &id))?;
    Ok(Json(TaskGroupResponse::from(group)))
}

/// `PUT|PATCH /task-groups/{id}` — rename a group.
///
/// The name is the only mutable field, so replace and partial update
/// coincide.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<TaskGroupBody>,
) -> Result<Json<TaskGroupResponse>, ApiError> {
    let repo = GroupRepository::new(state.db.client(), user.id());
    let group = repo
        .update(&id, &TaskGroupPatch::new().with_name(body.name))
        .await?
        .ok_or_else(|| ApiError::not_found("task_group", &id))?;
    Ok(Json(TaskGroupResponse::from(group)))
}

/// `DELETE /task-groups/{id}` — delete a group and its member tasks.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = GroupRepository::new(state.db.client(), user.id());
    if !repo.delete(&id).await? {
        return Err(ApiError::not_found("task_group", &id));
    }
    Ok(StatusCode::NO_CONTENT)
}
