// src/models/level.rs

use serde::{Deserialize, Serialize};

/// Ordered proficiency levels of a competency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetencyLevel {
    Basic,
    Intermediate,
    Advanced,
    Mastery,
}

impl CompetencyLevel {
    /// All levels, lowest first. Drives the BY_LEVEL selection order.
    pub const ALL: [CompetencyLevel; 4] = [
        CompetencyLevel::Basic,
        CompetencyLevel::Intermediate,
        CompetencyLevel::Advanced,
        CompetencyLevel::Mastery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompetencyLevel::Basic => "BASIC",
            CompetencyLevel::Intermediate => "INTERMEDIATE",
            CompetencyLevel::Advanced => "ADVANCED",
            CompetencyLevel::Mastery => "MASTERY",
        }
    }
}
