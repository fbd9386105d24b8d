// src/grading/submission.rs

use crate::models::{assessment::Assessment, attempt::Attempt};

/// The gradebook values synced into `assessment_submissions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionScore {
    pub attempt_id: i64,
    pub score: Option<i32>,
    pub total_points: i32,
    pub is_graded: bool,
}

/// Chooses the attempt that represents the learner in the gradebook:
/// the best score when retakes are allowed, otherwise the latest.
/// Only completed attempts are considered.
pub fn canonical_attempt(attempts: &[Attempt], allow_retakes: bool) -> Option<&Attempt> {
    let completed = attempts.iter().filter(|a| a.is_completed());

    if allow_retakes {
        // Ties go to the most recent attempt.
        completed.max_by(|a, b| {
            a.score
                .unwrap_or(0)
                .cmp(&b.score.unwrap_or(0))
                .then(a.completed_at.cmp(&b.completed_at))
                .then(a.id.cmp(&b.id))
        })
    } else {
        completed.max_by(|a, b| a.completed_at.cmp(&b.completed_at).then(a.id.cmp(&b.id)))
    }
}

/// Computes the submission row for an assessment from all of a learner's
/// attempts. Final exams withhold the score until the attempt is graded.
pub fn sync_submission(assessment: &Assessment, attempts: &[Attempt]) -> Option<SubmissionScore> {
    let chosen = canonical_attempt(attempts, assessment.allow_retakes)?;

    let score = if assessment.is_final_exam() && !chosen.is_graded {
        None
    } else {
        Some(chosen.score.unwrap_or(0))
    };

    Some(SubmissionScore {
        attempt_id: chosen.id,
        score,
        total_points: chosen.total_points,
        is_graded: chosen.is_graded,
    })
}
