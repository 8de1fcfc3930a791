// src/models/session.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::{
    assessment::EffectiveSettings, level::CompetencyLevel, question::PublicQuestion,
};

/// Session lifecycle. IN_PROGRESS transitions to COMPLETED exactly once;
/// COMPLETED is terminal. There is no server-side expiry or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// Represents the 'assessment_sessions' table: one attempt by one user at
/// one competency's assessment. Terminal fields stay NULL until completion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssessmentSession {
    pub id: i64,
    pub user_id: i64,
    pub competency_id: i64,
    /// The assessment whose settings governed this session, when one was
    /// resolved from the catalog; NULL when the built-in defaults applied.
    pub assessment_id: Option<i64>,
    pub status: SessionStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub score: Option<i64>,
    pub percentage_score: Option<i64>,
    pub correct_answers: Option<i64>,
    pub total_questions: Option<i64>,
    pub system_level: Option<CompetencyLevel>,
    pub user_confirmed_level: Option<CompetencyLevel>,
    pub manager_selected_level: Option<CompetencyLevel>,
}

impl AssessmentSession {
    /// The level downstream consumers should treat as authoritative:
    /// manager > user > system, first non-null wins.
    pub fn effective_level(&self) -> Option<CompetencyLevel> {
        self.manager_selected_level
            .or(self.user_confirmed_level)
            .or(self.system_level)
    }
}

/// DTO for starting a session.
#[derive(Debug, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(range(min = 1, message = "user_id is required"))]
    pub user_id: i64,
    #[validate(range(min = 1, message = "competency_id is required"))]
    pub competency_id: i64,
    /// Optional explicit assessment; otherwise resolved by precedence.
    pub assessment_id: Option<i64>,
}

/// DTO returned by a successful start: the bound paper plus the settings
/// the client needs to run the attempt (timer, display flags).
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: i64,
    pub user_id: i64,
    pub competency_id: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub questions: Vec<PublicQuestion>,
    pub settings: EffectiveSettings,
}

/// One submitted answer. `selected_option_id` carries MULTIPLE_CHOICE picks,
/// `answer_text` carries TRUE_FALSE / SHORT_ANSWER / ESSAY input.
/// Serialize is required by the validator rule on the containing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub answer_text: Option<String>,
}

/// DTO for submitting a session.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitSessionRequest {
    #[validate(length(min = 1, message = "answers must not be empty"))]
    pub answers: Vec<SubmittedAnswer>,
}

/// DTO returned after scoring.
#[derive(Debug, Serialize)]
pub struct SubmitSessionResponse {
    pub session_id: i64,
    pub status: SessionStatus,
    pub score: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub percentage_score: i64,
    pub system_level: CompetencyLevel,
}

/// DTO for the user/manager level opinion writes.
#[derive(Debug, Deserialize)]
pub struct LevelOpinionRequest {
    pub level: CompetencyLevel,
}

/// Attempt accounting for a (user, competency) pair, derived from
/// COMPLETED sessions only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttemptsInfo {
    pub attempts_used: i64,
    pub attempts_allowed: i64,
    pub attempts_left: i64,
}

/// DTO exposing the latest COMPLETED session to collaborators such as gap
/// analysis, including the resolved effective level.
#[derive(Debug, Serialize)]
pub struct LatestResult {
    pub session_id: i64,
    pub user_id: i64,
    pub competency_id: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub score: Option<i64>,
    pub percentage_score: Option<i64>,
    pub correct_answers: Option<i64>,
    pub total_questions: Option<i64>,
    pub system_level: Option<CompetencyLevel>,
    pub user_confirmed_level: Option<CompetencyLevel>,
    pub manager_selected_level: Option<CompetencyLevel>,
    pub effective_level: Option<CompetencyLevel>,
}

impl From<AssessmentSession> for LatestResult {
    fn from(s: AssessmentSession) -> Self {
        let effective_level = s.effective_level();
        LatestResult {
            session_id: s.id,
            user_id: s.user_id,
            competency_id: s.competency_id,
            completed_at: s.completed_at,
            score: s.score,
            percentage_score: s.percentage_score,
            correct_answers: s.correct_answers,
            total_questions: s.total_questions,
            system_level: s.system_level,
            user_confirmed_level: s.user_confirmed_level,
            manager_selected_level: s.manager_selected_level,
            effective_level,
        }
    }
}
