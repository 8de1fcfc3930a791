// src/engine/settings.rs

use sqlx::SqlitePool;

use crate::{error::AppError, models::assessment::AssessmentSettings};

const SETTINGS_COLUMNS: &str = "id, competency_id, apply_to_all, active, num_questions, \
     time_limit_minutes, selection_strategy, allow_multiple_attempts, max_attempts, \
     show_results, show_correct_answers";

/// Resolves the effective assessment settings for a competency.
///
/// Precedence: explicit assessment id, then the active assessment scoped to
/// the competency, then a single global "apply to all" assessment, then the
/// built-in defaults. Modeled as one explicit chain rather than cascading
/// nullable joins.
pub async fn resolve(
    pool: &SqlitePool,
    assessment_id: Option<i64>,
    competency_id: i64,
) -> Result<AssessmentSettings, AppError> {
    if let Some(id) = assessment_id {
        let explicit = sqlx::query_as::<_, AssessmentSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM assessments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        return explicit.ok_or_else(|| AppError::NotFound(format!("Assessment {} not found", id)));
    }

    let scoped = sqlx::query_as::<_, AssessmentSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM assessments \
         WHERE competency_id = ? AND active = 1 \
         ORDER BY id DESC LIMIT 1"
    ))
    .bind(competency_id)
    .fetch_optional(pool)
    .await?;

    if let Some(settings) = scoped {
        return Ok(settings);
    }

    let global = sqlx::query_as::<_, AssessmentSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM assessments \
         WHERE apply_to_all = 1 AND active = 1 \
         ORDER BY id DESC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;

    Ok(global.unwrap_or_else(AssessmentSettings::fallback))
}
