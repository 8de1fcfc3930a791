// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::models::level::CompetencyLevel;

/// Question kinds supported by the bank. Only MULTIPLE_CHOICE and TRUE_FALSE
/// are auto-scorable; SHORT_ANSWER and ESSAY await manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

/// Represents the 'questions' table. Owned by the question bank; the engine
/// only ever reads these rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub competency_id: i64,
    pub competency_level: Option<CompetencyLevel>,
    pub question_type: QuestionType,
    pub text: String,
    pub points: i64,
    pub active: bool,
}

/// Represents the 'question_options' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
    pub display_order: i64,
}

/// DTO for sending an option to the client (excludes `is_correct`).
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

/// DTO for the question payload handed out when a session starts.
/// Options arrive pre-shuffled so the correct answer position is not
/// predictable from the catalog's display order.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_type: QuestionType,
    pub text: String,
    pub points: i64,
    pub options: Vec<PublicOption>,
}
