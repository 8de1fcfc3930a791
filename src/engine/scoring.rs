// src/engine/scoring.rs

use sqlx::prelude::FromRow;

use crate::models::{level::CompetencyLevel, question::QuestionType, session::SubmittedAnswer};

/// The authoritative correct option for a question, re-read from storage at
/// scoring time. A client-supplied correctness claim is never consulted.
#[derive(Debug, Clone, FromRow)]
pub struct CorrectOption {
    pub id: i64,
    pub text: String,
}

/// Outcome of grading one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Graded {
    pub is_correct: bool,
    pub points_earned: i64,
}

/// Grades a single answer against the authoritative correct option.
///
/// SHORT_ANSWER and ESSAY are always recorded as not-correct with 0 points:
/// a manual-review placeholder, deliberately preserved.
pub fn grade(
    question_type: QuestionType,
    points: i64,
    correct: Option<&CorrectOption>,
    answer: &SubmittedAnswer,
) -> Graded {
    let is_correct = match question_type {
        QuestionType::MultipleChoice => match correct {
            Some(option) => answer.selected_option_id == Some(option.id),
            None => false,
        },
        QuestionType::TrueFalse => match correct {
            Some(option) => answer.answer_text.as_deref() == Some(option.text.as_str()),
            None => false,
        },
        QuestionType::ShortAnswer | QuestionType::Essay => false,
    };

    Graded {
        is_correct,
        points_earned: if is_correct { points } else { 0 },
    }
}

/// Integer percentage, rounded half-up. Caller guarantees `total > 0`.
pub fn percentage(correct: i64, total: i64) -> i64 {
    (correct * 100 + total / 2) / total
}

/// Maps a percentage score to the system-derived level. Fixed policy
/// thresholds; downstream consumers depend on these exact bands.
pub fn level_for_percentage(percentage: i64) -> CompetencyLevel {
    if percentage >= 80 {
        CompetencyLevel::Mastery
    } else if percentage >= 60 {
        CompetencyLevel::Advanced
    } else if percentage >= 40 {
        CompetencyLevel::Intermediate
    } else {
        CompetencyLevel::Basic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(selected: Option<i64>, text: Option<&str>) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: 1,
            selected_option_id: selected,
            answer_text: text.map(str::to_owned),
        }
    }

    fn correct_option() -> CorrectOption {
        CorrectOption {
            id: 42,
            text: "True".to_owned(),
        }
    }

    #[test]
    fn multiple_choice_matches_on_option_id() {
        let option = correct_option();
        let right = grade(
            QuestionType::MultipleChoice,
            3,
            Some(&option),
            &answer(Some(42), None),
        );
        assert!(right.is_correct);
        assert_eq!(right.points_earned, 3);

        let wrong = grade(
            QuestionType::MultipleChoice,
            3,
            Some(&option),
            &answer(Some(41), None),
        );
        assert!(!wrong.is_correct);
        assert_eq!(wrong.points_earned, 0);
    }

    #[test]
    fn true_false_matches_on_option_text() {
        let option = correct_option();
        assert!(
            grade(
                QuestionType::TrueFalse,
                1,
                Some(&option),
                &answer(None, Some("True"))
            )
            .is_correct
        );
        assert!(
            !grade(
                QuestionType::TrueFalse,
                1,
                Some(&option),
                &answer(None, Some("False"))
            )
            .is_correct
        );
    }

    #[test]
    fn free_text_types_await_manual_review() {
        assert!(!grade(QuestionType::ShortAnswer, 5, None, &answer(None, Some("42"))).is_correct);
        assert!(!grade(QuestionType::Essay, 5, None, &answer(None, Some("..."))).is_correct);
    }

    #[test]
    fn question_without_correct_option_cannot_be_scored() {
        assert!(!grade(QuestionType::MultipleChoice, 1, None, &answer(Some(1), None)).is_correct);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(7, 10), 70);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn level_banding_is_exact_at_the_thresholds() {
        assert_eq!(level_for_percentage(0), CompetencyLevel::Basic);
        assert_eq!(level_for_percentage(39), CompetencyLevel::Basic);
        assert_eq!(level_for_percentage(40), CompetencyLevel::Intermediate);
        assert_eq!(level_for_percentage(59), CompetencyLevel::Intermediate);
        assert_eq!(level_for_percentage(60), CompetencyLevel::Advanced);
        assert_eq!(level_for_percentage(79), CompetencyLevel::Advanced);
        assert_eq!(level_for_percentage(80), CompetencyLevel::Mastery);
        assert_eq!(level_for_percentage(100), CompetencyLevel::Mastery);
    }
}
