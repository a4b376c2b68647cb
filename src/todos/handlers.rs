use axum::{
    extract::{Path, State},
    response::{Json, Redirect},
    routing::{get, post},
    Form, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    session::CurrentUser,
    state::AppState,
    todos::{
        dto::{TaskForm, TaskView},
        repo::Task,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todo", get(list_tasks))
        .route("/todo/add", post(add_task))
        .route("/todo/edit/:id", get(edit_task_form).post(edit_task))
        .route("/todo/delete/:id", post(delete_task))
}

/// Task ids arrive as raw path strings. A string that is not a valid id can
/// never name an existing task, so it reports NotFound rather than leaking
/// a parser error.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Todo not found".into()))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TaskView>>, AppError> {
    let tasks = Task::list_by_owner(&state.db, user.id).await?;
    let items = tasks
        .into_iter()
        .map(|t| TaskView {
            id: t.id,
            task: t.task,
            created_at: t.created_at,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, form))]
pub async fn add_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<TaskForm>,
) -> Result<Redirect, AppError> {
    let Some(text) = form.text() else {
        return Err(AppError::Validation("Task text is required".into()));
    };
    let task = Task::create(&state.db, user.id, text).await?;
    info!(user_id = %user.id, task_id = %task.id, "task added");
    Ok(Redirect::to("/todo"))
}

#[instrument(skip(state))]
pub async fn edit_task_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TaskView>, AppError> {
    let task_id = parse_task_id(&id)?;
    let task = Task::find_owned(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
    Ok(Json(TaskView {
        id: task.id,
        task: task.task,
        created_at: task.created_at,
    }))
}

#[instrument(skip(state, form))]
pub async fn edit_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Redirect, AppError> {
    let task_id = parse_task_id(&id)?;
    let Some(text) = form.text() else {
        return Err(AppError::Validation("Task text is required".into()));
    };
    let updated = Task::update_owned(&state.db, task_id, user.id, text).await?;
    if updated == 0 {
        warn!(user_id = %user.id, %task_id, "edit target missing or not owned");
        return Err(AppError::NotFound("Todo not found".into()));
    }
    Ok(Redirect::to("/todo"))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let task_id = parse_task_id(&id)?;
    let removed = Task::delete_owned(&state.db, task_id, user.id).await?;
    if removed == 0 {
        warn!(user_id = %user.id, %task_id, "delete target missing or not owned");
        return Err(AppError::NotFound("Todo not found".into()));
    }
    info!(user_id = %user.id, %task_id, "task deleted");
    Ok(Redirect::to("/todo"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_task_id("definitely-not-a-uuid").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn well_formed_id_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
    }
}
