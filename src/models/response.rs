// src/models/response.rs

use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::models::question::QuestionType;

/// Represents the 'assessment_responses' table: one row per answered
/// question per session. Created once at scoring time, never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssessmentResponse {
    pub id: i64,
    pub session_id: i64,
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub answer_text: Option<String>,
    pub is_correct: bool,
    pub points_earned: i64,
}

/// Joined row backing the response-detail view.
#[derive(Debug, FromRow)]
pub struct ResponseDetailRow {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub selected_option_id: Option<i64>,
    pub selected_option_text: Option<String>,
    pub answer_text: Option<String>,
    pub correct_option_text: Option<String>,
    pub is_correct: bool,
    pub points_earned: i64,
}

/// DTO for reviewing a session. Correctness and the correct answer are only
/// populated when the resolved settings allow revealing them.
#[derive(Debug, Serialize)]
pub struct ResponseDetail {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub selected_option_id: Option<i64>,
    pub selected_option_text: Option<String>,
    pub answer_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<i64>,
}

impl ResponseDetail {
    pub fn from_row(row: ResponseDetailRow, reveal_correct_answers: bool) -> Self {
        ResponseDetail {
            question_id: row.question_id,
            question_text: row.question_text,
            question_type: row.question_type,
            selected_option_id: row.selected_option_id,
            selected_option_text: row.selected_option_text,
            answer_text: row.answer_text,
            correct_option_text: if reveal_correct_answers {
                row.correct_option_text
            } else {
                None
            },
            is_correct: reveal_correct_answers.then_some(row.is_correct),
            points_earned: reveal_correct_answers.then_some(row.points_earned),
        }
    }
}
