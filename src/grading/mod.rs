// src/grading/mod.rs

//! Assessment grading rules.
//!
//! Everything here is a pure function over loaded rows; the database work
//! around it lives in `services::grading`.

pub mod final_score;
pub mod lifecycle;
pub mod powerups;
pub mod scoring;
pub mod submission;

/// A request that is well-formed but breaks a grading or reward rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleViolation {
    #[error("Retakes are not allowed for this assessment")]
    RetakesNotAllowed,

    #[error("Attempt limit of {max} reached")]
    AttemptLimitReached { max: i32 },

    #[error("Attempt is already completed")]
    AttemptCompleted,

    #[error("Attempt has not been submitted yet")]
    AttemptInProgress,

    #[error("Attempt time has expired")]
    AttemptExpired,

    #[error("Remedial attempts are only available for final exams")]
    RemedialNotFinalExam,

    #[error("The final exam has not been taken yet")]
    RemedialExamNotTaken,

    #[error("The final exam attempt is still awaiting review")]
    RemedialExamNotGraded,

    #[error("No final score recorded for this course yet")]
    RemedialNoFinalScore,

    #[error("Final score {total} is not below the remedial threshold of {threshold}")]
    RemedialNotNeeded { total: i32, threshold: i32 },

    #[error("A remedial attempt has already been taken")]
    RemedialAlreadyTaken,

    #[error("Powerups cannot be used on final exams")]
    PowerupsDisabled,

    #[error("Powerup '{0}' is not allowed on this assessment")]
    PowerupNotAllowed(String),

    #[error("Powerup '{slug}' can only be used {limit} time(s) per attempt")]
    PowerupLimitReached { slug: &'static str, limit: i32 },

    #[error("50-50 can only be used on multiple choice questions")]
    NotMultipleChoice,

    #[error("Question has already been answered")]
    QuestionAnswered,

    #[error("50-50 has already been used on this question")]
    OptionsAlreadyReduced,

    #[error("Assessment has no time limit")]
    NoTimeLimit,

    #[error("Not enough points: balance {balance}, cost {cost}")]
    InsufficientPoints { balance: i64, cost: i64 },

    #[error("Reward is out of stock")]
    OutOfStock,

    #[error("Reward is not available")]
    RewardUnavailable,
}

impl RuleViolation {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::RetakesNotAllowed => "retakes_not_allowed",
            RuleViolation::AttemptLimitReached { .. } => "attempt_limit_reached",
            RuleViolation::AttemptCompleted => "attempt_completed",
            RuleViolation::AttemptInProgress => "attempt_in_progress",
            RuleViolation::AttemptExpired => "attempt_expired",
            RuleViolation::RemedialNotFinalExam => "remedial_not_final_exam",
            RuleViolation::RemedialExamNotTaken => "remedial_exam_not_taken",
            RuleViolation::RemedialExamNotGraded => "remedial_exam_not_graded",
            RuleViolation::RemedialNoFinalScore => "remedial_no_final_score",
            RuleViolation::RemedialNotNeeded { .. } => "remedial_not_needed",
            RuleViolation::RemedialAlreadyTaken => "remedial_already_taken",
            RuleViolation::PowerupsDisabled => "powerups_disabled",
            RuleViolation::PowerupNotAllowed(_) => "powerup_not_allowed",
            RuleViolation::PowerupLimitReached { .. } => "powerup_limit_reached",
            RuleViolation::NotMultipleChoice => "not_multiple_choice",
            RuleViolation::QuestionAnswered => "question_answered",
            RuleViolation::OptionsAlreadyReduced => "options_already_reduced",
            RuleViolation::NoTimeLimit => "no_time_limit",
            RuleViolation::InsufficientPoints { .. } => "insufficient_points",
            RuleViolation::OutOfStock => "out_of_stock",
            RuleViolation::RewardUnavailable => "reward_unavailable",
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use sqlx::types::Json;

    use crate::models::{
        assessment::{Assessment, AssessmentType},
        attempt::{AnswerSheet, Attempt},
        question::{AnswerConfig, Question},
    };

    pub fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap() + chrono::Duration::minutes(minute as i64)
    }

    pub fn assessment(kind: AssessmentType) -> Assessment {
        Assessment {
            id: 1,
            course_id: 10,
            title: "Cell biology".to_string(),
            assessment_type: kind,
            max_score: 10,
            allow_retakes: true,
            max_attempts: None,
            time_limit_minutes: Some(30),
            weight_percentage: None,
            is_published: true,
            created_at: None,
        }
    }

    pub fn question(id: i64, config: AnswerConfig, points: i32) -> Question {
        Question {
            id,
            assessment_id: 1,
            content: format!("Question {id}"),
            answer_config: Json(config),
            points,
            position: id as i32,
        }
    }

    pub fn multiple_choice(id: i64, correct_index: usize, points: i32) -> Question {
        question(
            id,
            AnswerConfig::MultipleChoice {
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_index,
            },
            points,
        )
    }

    pub fn attempt(id: i64, started: u32, completed: Option<u32>, score: Option<i32>) -> Attempt {
        Attempt {
            id,
            assessment_id: 1,
            user_id: 100,
            answers: Json(AnswerSheet::new()),
            score,
            total_points: 10,
            started_at: at(started),
            completed_at: completed.map(at),
            is_graded: completed.is_some(),
            is_remedial: false,
            points_awarded: 0,
            time_extension: 0,
        }
    }
}
