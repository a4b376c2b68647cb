use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use tracing::instrument;

use crate::{
    error::AppError, session::CurrentUser, state::AppState, userdata::repo::DataRecord,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/data", get(dump_data))
}

#[instrument(skip(state))]
pub async fn dump_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let records = DataRecord::list_by_owner(&state.db, user.id).await?;
    if records.is_empty() {
        return Err(AppError::NotFound("No data found for this user".into()));
    }
    Ok(Json(json!({ "data": records })))
}
