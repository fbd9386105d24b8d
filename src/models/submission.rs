// src/models/submission.rs

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'final_scores' table: one row per (user, course).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinalScore {
    pub user_id: i64,
    pub course_id: i64,
    /// Average quiz percentage, 0–100.
    pub quiz_score: f64,
    /// Average final exam percentage, 0–100.
    pub final_exam_score: f64,
    pub total_score: i32,
    pub is_remedial: bool,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One learner's line in a course gradebook.
#[derive(Debug, Serialize, FromRow)]
pub struct GradebookEntry {
    pub assessment_id: i64,
    pub assessment_title: String,
    pub user_id: i64,
    pub username: String,
    pub score: Option<i32>,
    pub total_points: i32,
    pub is_graded: bool,
}

#[derive(Debug, Serialize)]
pub struct GradebookResponse {
    pub submissions: Vec<GradebookEntry>,
    pub final_scores: Vec<FinalScore>,
}
