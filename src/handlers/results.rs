// src/handlers/results.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    engine::{attempts, settings},
    error::AppError,
    models::{
        response::{ResponseDetail, ResponseDetailRow},
        session::{AssessmentSession, LatestResult, SessionStatus},
    },
};

/// Attempt accounting for a (user, competency) pair under the currently
/// resolved settings.
pub async fn attempts_info(
    State(pool): State<SqlitePool>,
    Path((user_id, competency_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let settings = settings::resolve(&pool, None, competency_id).await?;
    let info = attempts::attempts_info(&pool, user_id, competency_id, &settings).await?;
    Ok(Json(info))
}

/// The latest COMPLETED session for a (user, competency) pair, with all
/// three level opinions and the resolved effective level. This is the view
/// gap-analysis and manager dashboards consume.
pub async fn latest_result(
    State(pool): State<SqlitePool>,
    Path((user_id, competency_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let session: Option<AssessmentSession> = sqlx::query_as(
        "SELECT id, user_id, competency_id, assessment_id, status, started_at, completed_at, \
         score, percentage_score, correct_answers, total_questions, system_level, \
         user_confirmed_level, manager_selected_level \
         FROM assessment_sessions \
         WHERE user_id = ? AND competency_id = ? AND status = ? \
         ORDER BY completed_at DESC, id DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(competency_id)
    .bind(SessionStatus::Completed)
    .fetch_optional(&pool)
    .await?;

    let session = session.ok_or_else(|| {
        AppError::NotFound(format!(
            "No completed session for user {} and competency {}",
            user_id, competency_id
        ))
    })?;

    Ok(Json(LatestResult::from(session)))
}

/// Full response detail for a session: question text, the chosen answer and,
/// when the resolved settings reveal them, the correct answer and
/// correctness.
pub async fn session_responses(
    State(pool): State<SqlitePool>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session: AssessmentSession = sqlx::query_as(
        "SELECT id, user_id, competency_id, assessment_id, status, started_at, completed_at, \
         score, percentage_score, correct_answers, total_questions, system_level, \
         user_confirmed_level, manager_selected_level \
         FROM assessment_sessions WHERE id = ?",
    )
    .bind(session_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::SessionNotFound(session_id))?;

    // Judge the reveal flag by the assessment the session was started under,
    // not whatever currently resolves for the competency.
    let settings =
        settings::resolve(&pool, session.assessment_id, session.competency_id).await?;

    let rows: Vec<ResponseDetailRow> = sqlx::query_as(
        "SELECT r.question_id, q.text AS question_text, q.question_type, \
                r.selected_option_id, so.text AS selected_option_text, r.answer_text, \
                co.text AS correct_option_text, r.is_correct, r.points_earned \
         FROM assessment_responses r \
         JOIN questions q ON q.id = r.question_id \
         LEFT JOIN question_options so ON so.id = r.selected_option_id \
         LEFT JOIN question_options co \
                ON co.question_id = r.question_id AND co.is_correct = 1 \
         WHERE r.session_id = ? \
         ORDER BY r.id",
    )
    .bind(session_id)
    .fetch_all(&pool)
    .await?;

    let reveal = settings.show_correct_answers;
    let details: Vec<ResponseDetail> = rows
        .into_iter()
        .map(|row| ResponseDetail::from_row(row, reveal))
        .collect();

    Ok(Json(details))
}
