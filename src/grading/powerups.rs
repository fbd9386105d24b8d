// src/grading/powerups.rs

use chrono::{DateTime, Utc};
use rand::{Rng, seq::SliceRandom};

use crate::{
    config::{DEFAULT_EXTRA_TIME_SECONDS, DEFAULT_FIFTY_FIFTY_REMOVALS},
    grading::{RuleViolation, lifecycle},
    models::{
        assessment::Assessment,
        attempt::Attempt,
        powerup::{AllowedPowerup, PowerupKind},
        question::{AnswerConfig, Question},
    },
};

/// Common preconditions for any powerup use.
///
/// `allowed` is the assessment's pivot entry for the requested powerup,
/// `None` when it is not in the allowed set. `used` counts earlier uses
/// of the same powerup on this attempt.
pub fn check_usable(
    kind: PowerupKind,
    assessment: &Assessment,
    attempt: &Attempt,
    allowed: Option<&AllowedPowerup>,
    used: i64,
    now: DateTime<Utc>,
) -> Result<(), RuleViolation> {
    if assessment.is_final_exam() {
        return Err(RuleViolation::PowerupsDisabled);
    }
    lifecycle::ensure_open(attempt, assessment.time_limit_minutes, now)?;

    let allowed = allowed.ok_or_else(|| RuleViolation::PowerupNotAllowed(kind.slug().to_string()))?;
    if used >= allowed.usage_limit as i64 {
        return Err(RuleViolation::PowerupLimitReached {
            slug: kind.slug(),
            limit: allowed.usage_limit,
        });
    }
    Ok(())
}

/// Picks incorrect options to hide on an unanswered multiple choice
/// question. Returns the removed indices in ascending order.
pub fn fifty_fifty<R: Rng + ?Sized>(
    question: &Question,
    attempt: &Attempt,
    already_reduced: bool,
    remove_count: Option<usize>,
    rng: &mut R,
) -> Result<Vec<usize>, RuleViolation> {
    let AnswerConfig::MultipleChoice {
        options,
        correct_index,
    } = &question.answer_config.0
    else {
        return Err(RuleViolation::NotMultipleChoice);
    };
    if already_reduced {
        return Err(RuleViolation::OptionsAlreadyReduced);
    }
    if attempt.answers.is_answered(question.id) {
        return Err(RuleViolation::QuestionAnswered);
    }

    let incorrect: Vec<usize> = (0..options.len()).filter(|i| i != correct_index).collect();
    let count = remove_count
        .unwrap_or(DEFAULT_FIFTY_FIFTY_REMOVALS)
        .min(incorrect.len());

    let mut removed: Vec<usize> = incorrect.choose_multiple(rng, count).copied().collect();
    removed.sort_unstable();
    Ok(removed)
}

/// Seconds to add for an extra-time use. Untimed assessments reject it.
pub fn extra_time(assessment: &Assessment, seconds: Option<i32>) -> Result<i32, RuleViolation> {
    match assessment.time_limit_minutes {
        Some(m) if m > 0 => Ok(seconds.unwrap_or(DEFAULT_EXTRA_TIME_SECONDS).max(0)),
        _ => Err(RuleViolation::NoTimeLimit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::fixtures::{assessment, at, attempt, multiple_choice, question};
    use crate::models::{assessment::AssessmentType, powerup::PowerupSettings};
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;
    use sqlx::types::Json;

    fn allowed(kind: PowerupKind, limit: i32) -> AllowedPowerup {
        AllowedPowerup {
            powerup_id: 1,
            slug: kind,
            name: kind.slug().to_string(),
            config: Json(PowerupSettings::default()),
            usage_limit: limit,
        }
    }

    #[test]
    fn rejected_on_final_exam() {
        let exam = assessment(AssessmentType::FinalExam);
        let a = attempt(1, 0, None, None);
        let entry = allowed(PowerupKind::ExtraTime, 3);
        assert_eq!(
            check_usable(PowerupKind::ExtraTime, &exam, &a, Some(&entry), 0, at(1)),
            Err(RuleViolation::PowerupsDisabled)
        );
    }

    #[test]
    fn rejected_when_not_allowed_or_exhausted() {
        let quiz = assessment(AssessmentType::Quiz);
        let a = attempt(1, 0, None, None);

        assert_eq!(
            check_usable(PowerupKind::FiftyFifty, &quiz, &a, None, 0, at(1)),
            Err(RuleViolation::PowerupNotAllowed("50-50".to_string()))
        );

        let entry = allowed(PowerupKind::FiftyFifty, 2);
        assert_eq!(
            check_usable(PowerupKind::FiftyFifty, &quiz, &a, Some(&entry), 1, at(1)),
            Ok(())
        );
        assert_eq!(
            check_usable(PowerupKind::FiftyFifty, &quiz, &a, Some(&entry), 2, at(1)),
            Err(RuleViolation::PowerupLimitReached {
                slug: "50-50",
                limit: 2
            })
        );
    }

    #[test]
    fn rejected_on_closed_attempt() {
        let quiz = assessment(AssessmentType::Quiz);
        let entry = allowed(PowerupKind::ExtraTime, 5);

        let done = attempt(1, 0, Some(10), Some(3));
        assert_eq!(
            check_usable(PowerupKind::ExtraTime, &quiz, &done, Some(&entry), 0, at(11)),
            Err(RuleViolation::AttemptCompleted)
        );

        let late = attempt(2, 0, None, None);
        assert_eq!(
            check_usable(PowerupKind::ExtraTime, &quiz, &late, Some(&entry), 0, at(40)),
            Err(RuleViolation::AttemptExpired)
        );
    }

    #[test]
    fn fifty_fifty_removes_only_incorrect_options() {
        let q = multiple_choice(7, 2, 5);
        let a = attempt(1, 0, None, None);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let removed = fifty_fifty(&q, &a, false, None, &mut rng).unwrap();
            assert_eq!(removed.len(), 2);
            assert!(!removed.contains(&2));
            assert!(removed.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn fifty_fifty_count_is_capped_by_incorrect_options() {
        let q = question(
            3,
            AnswerConfig::MultipleChoice {
                options: vec!["yes".into(), "no".into()],
                correct_index: 0,
            },
            1,
        );
        let a = attempt(1, 0, None, None);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(fifty_fifty(&q, &a, false, Some(5), &mut rng), Ok(vec![1]));
    }

    #[test]
    fn fifty_fifty_rejects_non_multiple_choice() {
        let q = question(3, AnswerConfig::Essay, 4);
        let a = attempt(1, 0, None, None);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            fifty_fifty(&q, &a, false, None, &mut rng),
            Err(RuleViolation::NotMultipleChoice)
        );
    }

    #[test]
    fn fifty_fifty_rejects_repeat_and_answered_question() {
        let q = multiple_choice(7, 0, 5);
        let mut a = attempt(1, 0, None, None);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            fifty_fifty(&q, &a, true, None, &mut rng),
            Err(RuleViolation::OptionsAlreadyReduced)
        );

        a.answers.0.set_response(7, json!(1));
        assert_eq!(
            fifty_fifty(&q, &a, false, None, &mut rng),
            Err(RuleViolation::QuestionAnswered)
        );
    }

    #[test]
    fn extra_time_requires_time_limit() {
        let mut quiz = assessment(AssessmentType::Quiz);
        assert_eq!(extra_time(&quiz, None), Ok(DEFAULT_EXTRA_TIME_SECONDS));
        assert_eq!(extra_time(&quiz, Some(120)), Ok(120));

        quiz.time_limit_minutes = None;
        assert_eq!(extra_time(&quiz, Some(120)), Err(RuleViolation::NoTimeLimit));
    }
}
