//! Task endpoints: owner-scoped CRUD plus the mark-complete action.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use taskboard_db::{NewTask, QueryParams, TaskPatch, TaskRepository};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::{ListEnvelope, PageParams, TaskBody, TaskPatchBody, TaskResponse};

/// `GET /tasks` — list the caller's tasks, filtered and paginated.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ListEnvelope<TaskResponse>>, ApiError> {
    let page_params = PageParams::from_query(&raw)?;
    let params = QueryParams::from(raw);

    let repo = TaskRepository::new(state.db.client(), user.id());
    let page = repo
        .list(
            &state.task_filters,
            &params,
            page_params.limit,
            page_params.offset,
        )
        .await?;

    Ok(Json(ListEnvelope {
        count: page.total,
        results: page.tasks.into_iter().map(TaskResponse::from).collect(),
    }))
}

/// `POST /tasks` — create a task owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<TaskBody>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let mut task = NewTask::new(body.name);
    task.description = body.description;
    task.due_date = body.due_date;
    task.created_at = body.created_at;
    task.group = body.group;

    let repo = TaskRepository::new(state.db.client(), user.id());
    let created = repo.create(&task).await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// `GET /tasks/{id}` — fetch one of the caller's tasks.
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let repo = TaskRepository::new(state.db.client(), user.id());
    let task = repo
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("task", &id))?;
    Ok(Json(TaskResponse::from(task)))
}

/// `PUT /tasks/{id}` — replace the full representation.
///
/// Fields absent from the body are cleared, matching replace semantics.
pub async fn replace(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<TaskBody>,
) -> Result<Json<TaskResponse>, ApiError> {
    let patch = TaskPatch {
        name: Some(body.name),
        description: Some(body.description),
        due_date: Some(body.due_date),
        finished_at: Some(body.finished_at),
        group: Some(body.group),
    };

    let repo = TaskRepository::new(state.db.client(), user.id());
    let task = repo
        .update(&id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("task", &id))?;
    Ok(Json(TaskResponse::from(task)))
}

/// `PATCH /tasks/{id}` — update only the supplied fields.
pub async fn modify(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<TaskPatchBody>,
) -> Result<Json<TaskResponse>, ApiError> {
    let patch = TaskPatch {
        name: body.name,
        description: body.description.map(Some),
        due_date: body.due_date.map(Some),
        finished_at: body.finished_at.map(Some),
        group: body.group.map(Some),
    };

    let repo = TaskRepository::new(state.db.client(), user.id());
    let task = repo
        .update(&id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("task", &id))?;
    Ok(Json(TaskResponse::from(task)))
}

/// `DELETE /tasks/{id}` — delete one of the caller's tasks.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = TaskRepository::new(state.db.client(), user.id());
    if !repo.delete(&id).await? {
        return Err(ApiError::not_found("task", &id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `POST|PATCH /tasks/{id}/complete` — mark a task as done.
///
/// Preferred over updating `finished_at` by hand; sets it to the
/// current UTC time and is idempotent.
pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let repo = TaskRepository::new(state.db.client(), user.id());
    let task = repo
        .complete(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("task", &id))?;
    Ok(Json(TaskResponse::from(task)))
}
