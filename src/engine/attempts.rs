// src/engine/attempts.rs

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        assessment::AssessmentSettings,
        session::{AttemptsInfo, SessionStatus},
    },
};

/// Derives attempt accounting from completed sessions. Pure read; `start`
/// re-evaluates this rather than trusting an earlier response.
pub async fn attempts_info(
    pool: &SqlitePool,
    user_id: i64,
    competency_id: i64,
    settings: &AssessmentSettings,
) -> Result<AttemptsInfo, AppError> {
    let used = completed_count(pool, user_id, competency_id).await?;
    Ok(derive(used, settings))
}

/// Count of COMPLETED sessions for the pair. IN_PROGRESS sessions never
/// count toward the limit.
pub async fn completed_count(
    pool: &SqlitePool,
    user_id: i64,
    competency_id: i64,
) -> Result<i64, AppError> {
    let used: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM assessment_sessions \
         WHERE user_id = ? AND competency_id = ? AND status = ?",
    )
    .bind(user_id)
    .bind(competency_id)
    .bind(SessionStatus::Completed)
    .fetch_one(pool)
    .await?;

    Ok(used)
}

/// attemptsAllowed = maxAttempts when multiples are enabled, otherwise 1.
/// A configured max_attempts of 0 means no attempts at all.
pub fn allowed_attempts(settings: &AssessmentSettings) -> i64 {
    if settings.allow_multiple_attempts {
        settings.max_attempts
    } else {
        1
    }
}

pub fn derive(used: i64, settings: &AssessmentSettings) -> AttemptsInfo {
    let allowed = allowed_attempts(settings);

    AttemptsInfo {
        attempts_used: used,
        attempts_allowed: allowed,
        attempts_left: (allowed - used).max(0),
    }
}
