// src/models/assessment.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// How questions are picked when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStrategy {
    Random,
    ByLevel,
}

/// Represents the 'assessments' table: per-competency (or global) settings.
/// Owned by configuration CRUD; read-only to the engine.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssessmentSettings {
    pub id: i64,
    pub competency_id: Option<i64>,
    pub apply_to_all: bool,
    pub active: bool,
    pub num_questions: i64,
    pub time_limit_minutes: Option<i64>,
    pub selection_strategy: SelectionStrategy,
    pub allow_multiple_attempts: bool,
    pub max_attempts: i64,
    pub show_results: bool,
    pub show_correct_answers: bool,
}

impl AssessmentSettings {
    /// Built-in defaults used when no assessment row matches the resolution
    /// chain (explicit id, per-competency, global apply-to-all).
    pub fn fallback() -> Self {
        AssessmentSettings {
            id: 0,
            competency_id: None,
            apply_to_all: false,
            active: true,
            num_questions: 10,
            time_limit_minutes: None,
            selection_strategy: SelectionStrategy::Random,
            allow_multiple_attempts: false,
            max_attempts: 1,
            show_results: true,
            show_correct_answers: false,
        }
    }
}

/// The slice of settings echoed back to the client when a session starts.
#[derive(Debug, Serialize)]
pub struct EffectiveSettings {
    pub num_questions: i64,
    pub time_limit_minutes: Option<i64>,
    pub selection_strategy: SelectionStrategy,
    pub show_results: bool,
    pub show_correct_answers: bool,
}

impl From<&AssessmentSettings> for EffectiveSettings {
    fn from(s: &AssessmentSettings) -> Self {
        EffectiveSettings {
            num_questions: s.num_questions,
            time_limit_minutes: s.time_limit_minutes,
            selection_strategy: s.selection_strategy,
            show_results: s.show_results,
            show_correct_answers: s.show_correct_answers,
        }
    }
}
