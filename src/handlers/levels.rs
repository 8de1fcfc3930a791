// src/handlers/levels.rs

use axum::{
    Json,
    extract::{Path, State},
};
use sqlx::SqlitePool;

use crate::{error::AppError, models::session::LevelOpinionRequest};

/// Records the user's own opinion of their level on a session. A plain field
/// write, not a state transition: re-confirming overwrites the prior value.
pub async fn confirm_user_level(
    State(pool): State<SqlitePool>,
    Path(session_id): Path<i64>,
    Json(payload): Json<LevelOpinionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    write_level(&pool, session_id, "user_confirmed_level", payload).await
}

/// Records a manager's level opinion on a session, independent of the user's.
/// Role enforcement happens in the auth layer in front of this service.
pub async fn set_manager_level(
    State(pool): State<SqlitePool>,
    Path(session_id): Path<i64>,
    Json(payload): Json<LevelOpinionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    write_level(&pool, session_id, "manager_selected_level", payload).await
}

async fn write_level(
    pool: &SqlitePool,
    session_id: i64,
    column: &'static str,
    payload: LevelOpinionRequest,
) -> Result<Json<serde_json::Value>, AppError> {
    // `column` is a compile-time constant, never caller input.
    let updated = sqlx::query(&format!(
        "UPDATE assessment_sessions SET {column} = ? WHERE id = ?"
    ))
    .bind(payload.level)
    .bind(session_id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::SessionNotFound(session_id));
    }

    tracing::info!(session_id, level = payload.level.as_str(), column, "level opinion recorded");

    let mut body = serde_json::Map::new();
    body.insert("session_id".to_string(), serde_json::json!(session_id));
    body.insert(column.to_string(), serde_json::json!(payload.level));

    Ok(Json(serde_json::Value::Object(body)))
}
