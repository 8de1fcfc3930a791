// src/handlers/sessions.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use sqlx::{Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    engine::{attempts, scoring, scoring::CorrectOption, selector, settings},
    error::AppError,
    models::{
        assessment::EffectiveSettings,
        question::{PublicOption, PublicQuestion, Question, QuestionOption},
        session::{
            AssessmentSession, SessionStatus, StartSessionRequest, StartSessionResponse,
            SubmitSessionRequest, SubmitSessionResponse,
        },
    },
};

/// Starts a new assessment session.
///
/// * Resolves effective settings, re-checks the attempt ledger.
/// * Selects questions under the configured strategy, excluding recently
///   seen ones.
/// * Shuffles each question's options per session so the correct answer
///   position is not predictable.
/// * Persists the session with a conditional insert that re-checks the
///   completed count, rejecting a start that races a concurrent completion.
///   Two starts can still overlap while neither is completed; the binding
///   enforcement sits on the COMPLETED transition in `submit_session`.
pub async fn start_session(
    State(pool): State<SqlitePool>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let settings =
        settings::resolve(&pool, payload.assessment_id, payload.competency_id).await?;

    let attempts = attempts::attempts_info(
        &pool,
        payload.user_id,
        payload.competency_id,
        &settings,
    )
    .await?;
    if attempts.attempts_left <= 0 {
        return Err(AppError::AttemptLimitReached {
            used: attempts.attempts_used,
            allowed: attempts.attempts_allowed,
        });
    }

    let exclude =
        selector::recent_question_ids(&pool, payload.user_id, payload.competency_id).await?;

    let mut rng = StdRng::from_entropy();
    let question_ids =
        selector::select_questions(&pool, payload.competency_id, &settings, &exclude, &mut rng)
            .await?;

    let need = selector::required_quantity(&settings);
    if question_ids.len() < need {
        return Err(AppError::InsufficientQuestions {
            found: question_ids.len(),
            need,
        });
    }

    let questions = build_paper(&pool, &question_ids, &mut rng).await?;

    // Remember which assessment governed this session so later reads judge
    // it by the same settings; NULL when the built-in defaults applied.
    let resolved_assessment_id = (settings.id > 0).then_some(settings.id);

    let started_at = Utc::now();
    let inserted = sqlx::query(
        "INSERT INTO assessment_sessions \
         (user_id, competency_id, assessment_id, status, started_at) \
         SELECT ?, ?, ?, ?, ? \
         WHERE (SELECT COUNT(*) FROM assessment_sessions \
                WHERE user_id = ? AND competency_id = ? AND status = ?) < ?",
    )
    .bind(payload.user_id)
    .bind(payload.competency_id)
    .bind(resolved_assessment_id)
    .bind(SessionStatus::InProgress)
    .bind(started_at)
    .bind(payload.user_id)
    .bind(payload.competency_id)
    .bind(SessionStatus::Completed)
    .bind(attempts.attempts_allowed)
    .execute(&pool)
    .await?;

    if inserted.rows_affected() == 0 {
        // Lost the race to a concurrent completion.
        return Err(AppError::AttemptLimitReached {
            used: attempts.attempts_allowed,
            allowed: attempts.attempts_allowed,
        });
    }

    let session_id = inserted.last_insert_rowid();
    tracing::info!(
        session_id,
        user_id = payload.user_id,
        competency_id = payload.competency_id,
        questions = questions.len(),
        "assessment session started"
    );

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            session_id,
            user_id: payload.user_id,
            competency_id: payload.competency_id,
            started_at,
            questions,
            settings: EffectiveSettings::from(&settings),
        }),
    ))
}

/// Fetches the selected questions in selection order and attaches a
/// session-local random permutation of each question's options.
async fn build_paper(
    pool: &SqlitePool,
    question_ids: &[i64],
    rng: &mut StdRng,
) -> Result<Vec<PublicQuestion>, AppError> {
    // Dynamic IN clause via QueryBuilder, bound parameters only.
    let mut query_builder = sqlx::QueryBuilder::<Sqlite>::new(
        "SELECT id, competency_id, competency_level, question_type, text, points, active \
         FROM questions WHERE id IN (",
    );
    let mut separated = query_builder.separated(",");
    for id in question_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let rows: Vec<Question> = query_builder.build_query_as().fetch_all(pool).await?;
    let mut by_id: HashMap<i64, Question> = rows.into_iter().map(|q| (q.id, q)).collect();

    let mut paper = Vec::with_capacity(question_ids.len());
    for id in question_ids {
        let Some(question) = by_id.remove(id) else {
            continue;
        };

        let mut options: Vec<QuestionOption> = sqlx::query_as(
            "SELECT id, question_id, text, is_correct, display_order \
             FROM question_options WHERE question_id = ? ORDER BY display_order, id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        options.shuffle(rng);

        paper.push(PublicQuestion {
            id: question.id,
            question_type: question.question_type,
            text: question.text,
            points: question.points,
            options: options
                .into_iter()
                .map(|o| PublicOption {
                    id: o.id,
                    text: o.text,
                })
                .collect(),
        });
    }

    Ok(paper)
}

/// Submits a session's answers and scores them.
///
/// * The session must exist and be IN_PROGRESS (blocks double submission).
/// * Each answer is graded against the authoritative correct option from
///   storage, never a client-supplied flag.
/// * A partial submission is scored on what was submitted.
/// * Responses and the COMPLETED transition commit in one transaction; this
///   transition is the only thing that consumes an attempt, so the UPDATE
///   itself re-checks the completed count. A session that raced another one
///   past `start` cannot push the pair over the configured maximum here.
pub async fn submit_session(
    State(pool): State<SqlitePool>,
    Path(session_id): Path<i64>,
    Json(payload): Json<SubmitSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

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

    if session.status != SessionStatus::InProgress {
        return Err(AppError::SessionNotInProgress(session_id));
    }

    let settings =
        settings::resolve(&pool, session.assessment_id, session.competency_id).await?;
    let attempts_allowed = attempts::allowed_attempts(&settings);

    let mut tx = pool.begin().await?;

    let mut total_score: i64 = 0;
    let mut correct_answers: i64 = 0;

    for answer in &payload.answers {
        let question: Option<Question> = sqlx::query_as(
            "SELECT id, competency_id, competency_level, question_type, text, points, active \
             FROM questions WHERE id = ?",
        )
        .bind(answer.question_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Unknown question ids still count toward the submitted total but
        // produce no response row.
        let Some(question) = question else {
            continue;
        };

        let correct_option: Option<CorrectOption> = sqlx::query_as(
            "SELECT id, text FROM question_options \
             WHERE question_id = ? AND is_correct = 1 LIMIT 1",
        )
        .bind(question.id)
        .fetch_optional(&mut *tx)
        .await?;

        let graded = scoring::grade(
            question.question_type,
            question.points,
            correct_option.as_ref(),
            answer,
        );

        sqlx::query(
            "INSERT INTO assessment_responses \
             (session_id, question_id, selected_option_id, answer_text, is_correct, points_earned) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(question.id)
        .bind(answer.selected_option_id)
        .bind(answer.answer_text.as_deref())
        .bind(graded.is_correct)
        .bind(graded.points_earned)
        .execute(&mut *tx)
        .await?;

        if graded.is_correct {
            correct_answers += 1;
        }
        total_score += graded.points_earned;
    }

    let total_questions = payload.answers.len() as i64;
    let percentage_score = scoring::percentage(correct_answers, total_questions);
    let system_level = scoring::level_for_percentage(percentage_score);
    let completed_at = Utc::now();

    // The completed-count guard serializes attempt-limit enforcement with
    // the transition that consumes the attempt.
    let updated = sqlx::query(
        "UPDATE assessment_sessions \
         SET status = ?, completed_at = ?, score = ?, percentage_score = ?, \
             correct_answers = ?, total_questions = ?, system_level = ? \
         WHERE id = ? AND status = ? \
           AND (SELECT COUNT(*) FROM assessment_sessions \
                WHERE user_id = ? AND competency_id = ? AND status = ?) < ?",
    )
    .bind(SessionStatus::Completed)
    .bind(completed_at)
    .bind(total_score)
    .bind(percentage_score)
    .bind(correct_answers)
    .bind(total_questions)
    .bind(system_level)
    .bind(session_id)
    .bind(SessionStatus::InProgress)
    .bind(session.user_id)
    .bind(session.competency_id)
    .bind(SessionStatus::Completed)
    .bind(attempts_allowed)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        // Either a concurrent submit won, or an overlapping session already
        // consumed the last attempt. Dropping the transaction rolls back.
        let used: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assessment_sessions \
             WHERE user_id = ? AND competency_id = ? AND status = ?",
        )
        .bind(session.user_id)
        .bind(session.competency_id)
        .bind(SessionStatus::Completed)
        .fetch_one(&mut *tx)
        .await?;

        return Err(if used >= attempts_allowed {
            AppError::AttemptLimitReached {
                used,
                allowed: attempts_allowed,
            }
        } else {
            AppError::SessionNotInProgress(session_id)
        });
    }

    tx.commit().await?;

    tracing::info!(
        session_id,
        score = total_score,
        percentage_score,
        system_level = system_level.as_str(),
        "assessment session completed"
    );

    Ok(Json(SubmitSessionResponse {
        session_id,
        status: SessionStatus::Completed,
        score: total_score,
        correct_answers,
        total_questions,
        percentage_score,
        system_level,
    }))
}
