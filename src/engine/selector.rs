// src/engine/selector.rs

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        assessment::{AssessmentSettings, SelectionStrategy},
        level::CompetencyLevel,
    },
};

/// How many of the user's most recent responses feed the exclusion set.
pub const RECENT_RESPONSE_WINDOW: i64 = 200;

/// BY_LEVEL draws a fixed 2 questions per level, 8 total.
pub const QUESTIONS_PER_LEVEL: usize = 2;
pub const BY_LEVEL_TOTAL: usize = QUESTIONS_PER_LEVEL * CompetencyLevel::ALL.len();

/// Draws `quantity` ids from `candidates` without replacement, preferring
/// ids outside `exclude`. If the exclusion leaves fewer than `quantity`
/// candidates, the draw falls back to the full pool rather than blocking
/// the user from taking the test. Returns min(quantity, pool size) ids.
pub fn draw<R: Rng + ?Sized>(
    candidates: &[i64],
    exclude: &HashSet<i64>,
    quantity: usize,
    rng: &mut R,
) -> Vec<i64> {
    let fresh: Vec<i64> = candidates
        .iter()
        .copied()
        .filter(|id| !exclude.contains(id))
        .collect();

    let pool: &[i64] = if fresh.len() >= quantity {
        &fresh
    } else {
        candidates
    };

    pool.choose_multiple(rng, quantity).copied().collect()
}

/// The exclusion set: question ids seen in the user's last
/// `RECENT_RESPONSE_WINDOW` responses for this competency, newest first.
pub async fn recent_question_ids(
    pool: &SqlitePool,
    user_id: i64,
    competency_id: i64,
) -> Result<HashSet<i64>, AppError> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT r.question_id FROM assessment_responses r \
         JOIN assessment_sessions s ON s.id = r.session_id \
         WHERE s.user_id = ? AND s.competency_id = ? \
         ORDER BY r.id DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(competency_id)
    .bind(RECENT_RESPONSE_WINDOW)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().collect())
}

async fn active_ids(pool: &SqlitePool, competency_id: i64) -> Result<Vec<i64>, AppError> {
    let ids = sqlx::query_scalar(
        "SELECT id FROM questions WHERE competency_id = ? AND active = 1",
    )
    .bind(competency_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

async fn active_ids_for_level(
    pool: &SqlitePool,
    competency_id: i64,
    level: CompetencyLevel,
) -> Result<Vec<i64>, AppError> {
    let ids = sqlx::query_scalar(
        "SELECT id FROM questions \
         WHERE competency_id = ? AND active = 1 AND competency_level = ?",
    )
    .bind(competency_id)
    .bind(level)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Selects the question ids for a new session under the configured strategy.
///
/// RANDOM draws `num_questions` from the whole active pool and fails with
/// `InsufficientQuestions` when the pool is too small. BY_LEVEL draws 2 per
/// level in BASIC..MASTERY order; a level with no eligible questions simply
/// contributes nothing (never padded from another level), so the result may
/// be shorter than 8 — the caller enforces the total.
pub async fn select_questions<R: Rng + ?Sized>(
    pool: &SqlitePool,
    competency_id: i64,
    settings: &AssessmentSettings,
    exclude: &HashSet<i64>,
    rng: &mut R,
) -> Result<Vec<i64>, AppError> {
    match settings.selection_strategy {
        SelectionStrategy::Random => {
            let need = settings.num_questions.max(0) as usize;
            let candidates = active_ids(pool, competency_id).await?;
            let drawn = draw(&candidates, exclude, need, rng);

            if drawn.len() < need {
                return Err(AppError::InsufficientQuestions {
                    found: drawn.len(),
                    need,
                });
            }
            Ok(drawn)
        }
        SelectionStrategy::ByLevel => {
            let mut selected = Vec::with_capacity(BY_LEVEL_TOTAL);
            for level in CompetencyLevel::ALL {
                let candidates = active_ids_for_level(pool, competency_id, level).await?;
                selected.extend(draw(&candidates, exclude, QUESTIONS_PER_LEVEL, rng));
            }
            Ok(selected)
        }
    }
}

/// The total a session requires before it may start.
pub fn required_quantity(settings: &AssessmentSettings) -> usize {
    match settings.selection_strategy {
        SelectionStrategy::Random => settings.num_questions.max(0) as usize,
        SelectionStrategy::ByLevel => BY_LEVEL_TOTAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn draw_skips_excluded_ids_when_pool_allows() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates: Vec<i64> = (1..=10).collect();
        let exclude: HashSet<i64> = [1, 2].into_iter().collect();

        let drawn = draw(&candidates, &exclude, 5, &mut rng);

        assert_eq!(drawn.len(), 5);
        assert!(drawn.iter().all(|id| !exclude.contains(id)));
        let unique: HashSet<i64> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn draw_falls_back_to_full_pool_when_exclusion_starves_it() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates: Vec<i64> = (1..=6).collect();
        let exclude: HashSet<i64> = (1..=5).collect();

        let drawn = draw(&candidates, &exclude, 4, &mut rng);

        // Only one fresh id exists, so the draw ignores the exclusion.
        assert_eq!(drawn.len(), 4);
    }

    #[test]
    fn draw_returns_whole_pool_when_quantity_exceeds_it() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates: Vec<i64> = vec![1, 2, 3];

        let drawn = draw(&candidates, &HashSet::new(), 10, &mut rng);

        assert_eq!(drawn.len(), 3);
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        sqlx::query("INSERT INTO competencies (id, name) VALUES (1, 'Rust')")
            .execute(&pool)
            .await
            .expect("seed competency");
        pool
    }

    async fn seed_question(pool: &SqlitePool, level: Option<&str>) {
        sqlx::query(
            "INSERT INTO questions (competency_id, competency_level, question_type, text, points) \
             VALUES (1, ?, 'MULTIPLE_CHOICE', 'q', 1)",
        )
        .bind(level)
        .execute(pool)
        .await
        .expect("seed question");
    }

    #[tokio::test]
    async fn by_level_draw_is_stratified() {
        let pool = seeded_pool().await;
        for level in ["BASIC", "INTERMEDIATE", "ADVANCED", "MASTERY"] {
            for _ in 0..4 {
                seed_question(&pool, Some(level)).await;
            }
        }

        let settings = AssessmentSettings {
            selection_strategy: SelectionStrategy::ByLevel,
            ..AssessmentSettings::fallback()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let selected = select_questions(&pool, 1, &settings, &HashSet::new(), &mut rng)
            .await
            .expect("selection");

        assert_eq!(selected.len(), BY_LEVEL_TOTAL);
        for level in ["BASIC", "INTERMEDIATE", "ADVANCED", "MASTERY"] {
            let count: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(*) FROM questions WHERE competency_level = '{level}' AND id IN ({})",
                selected
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ))
            .fetch_one(&pool)
            .await
            .expect("count");
            assert_eq!(count, QUESTIONS_PER_LEVEL as i64);
        }
    }

    #[tokio::test]
    async fn by_level_skips_empty_levels_without_padding() {
        let pool = seeded_pool().await;
        for _ in 0..3 {
            seed_question(&pool, Some("BASIC")).await;
        }
        // Unleveled questions are never eligible for BY_LEVEL.
        seed_question(&pool, None).await;

        let settings = AssessmentSettings {
            selection_strategy: SelectionStrategy::ByLevel,
            ..AssessmentSettings::fallback()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let selected = select_questions(&pool, 1, &settings, &HashSet::new(), &mut rng)
            .await
            .expect("selection");

        assert_eq!(selected.len(), QUESTIONS_PER_LEVEL);
    }

    #[tokio::test]
    async fn random_draw_fails_when_pool_is_too_small() {
        let pool = seeded_pool().await;
        for _ in 0..3 {
            seed_question(&pool, None).await;
        }

        let settings = AssessmentSettings::fallback();
        let mut rng = StdRng::seed_from_u64(42);
        let err = select_questions(&pool, 1, &settings, &HashSet::new(), &mut rng)
            .await
            .expect_err("should fail");

        match err {
            AppError::InsufficientQuestions { found, need } => {
                assert_eq!(found, 3);
                assert_eq!(need, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
