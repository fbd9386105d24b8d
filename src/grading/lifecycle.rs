// src/grading/lifecycle.rs

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    config::REMEDIAL_THRESHOLD,
    grading::{RuleViolation, submission::canonical_attempt},
    models::{assessment::Assessment, attempt::Attempt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    NotStarted,
    InProgress,
    Completed,
}

pub fn status(attempt: Option<&Attempt>) -> AttemptStatus {
    match attempt {
        None => AttemptStatus::NotStarted,
        Some(a) if a.is_completed() => AttemptStatus::Completed,
        Some(_) => AttemptStatus::InProgress,
    }
}

/// When the attempt runs out of time: start + limit + extension.
/// `None` for untimed assessments.
pub fn deadline(attempt: &Attempt, time_limit_minutes: Option<i32>) -> Option<DateTime<Utc>> {
    let minutes = time_limit_minutes.filter(|m| *m > 0)?;
    Some(
        attempt.started_at
            + Duration::minutes(minutes as i64)
            + Duration::seconds(attempt.time_extension.max(0) as i64),
    )
}

/// An in-progress attempt past its deadline. Completed attempts never expire.
pub fn is_expired(attempt: &Attempt, time_limit_minutes: Option<i32>, now: DateTime<Utc>) -> bool {
    if attempt.is_completed() {
        return false;
    }
    deadline(attempt, time_limit_minutes).is_some_and(|d| now > d)
}

/// Ensures the attempt still accepts answers and powerups.
pub fn ensure_open(
    attempt: &Attempt,
    time_limit_minutes: Option<i32>,
    now: DateTime<Utc>,
) -> Result<(), RuleViolation> {
    if attempt.is_completed() {
        return Err(RuleViolation::AttemptCompleted);
    }
    if is_expired(attempt, time_limit_minutes, now) {
        return Err(RuleViolation::AttemptExpired);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDecision {
    /// An open attempt exists; hand it back instead of creating another.
    Resume(i64),
    Create,
}

/// Decides whether a learner may start a regular attempt.
///
/// `attempts` are the learner's non-remedial attempts on this assessment.
/// Expired in-progress attempts count as finished.
pub fn check_can_start(
    assessment: &Assessment,
    attempts: &[Attempt],
    now: DateTime<Utc>,
) -> Result<StartDecision, RuleViolation> {
    if let Some(open) = attempts
        .iter()
        .find(|a| !a.is_completed() && !is_expired(a, assessment.time_limit_minutes, now))
    {
        return Ok(StartDecision::Resume(open.id));
    }

    if !assessment.allow_retakes && !attempts.is_empty() {
        return Err(RuleViolation::RetakesNotAllowed);
    }

    if let Some(max) = assessment.max_attempts {
        if attempts.len() as i64 >= max as i64 {
            return Err(RuleViolation::AttemptLimitReached { max });
        }
    }

    Ok(StartDecision::Create)
}

/// Gate for the remedial stream: final exams only, a graded regular
/// attempt behind a recorded final score below the threshold, and no
/// earlier remedial attempt.
pub fn check_remedial_eligibility(
    assessment: &Assessment,
    regular_attempts: &[Attempt],
    final_total: Option<i32>,
    has_remedial_attempt: bool,
) -> Result<(), RuleViolation> {
    if !assessment.is_final_exam() {
        return Err(RuleViolation::RemedialNotFinalExam);
    }
    let sat = canonical_attempt(regular_attempts, assessment.allow_retakes)
        .ok_or(RuleViolation::RemedialExamNotTaken)?;
    if !sat.is_graded {
        return Err(RuleViolation::RemedialExamNotGraded);
    }
    let total = final_total.ok_or(RuleViolation::RemedialNoFinalScore)?;
    if total >= REMEDIAL_THRESHOLD {
        return Err(RuleViolation::RemedialNotNeeded {
            total,
            threshold: REMEDIAL_THRESHOLD,
        });
    }
    if has_remedial_attempt {
        return Err(RuleViolation::RemedialAlreadyTaken);
    }
    Ok(())
}
