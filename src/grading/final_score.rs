// src/grading/final_score.rs

use crate::{
    config::{DEFAULT_FINAL_EXAM_WEIGHT, REMEDIAL_THRESHOLD},
    models::assessment::AssessmentType,
};

/// One course assessment with the learner's current submission, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseComponent {
    pub assessment_type: AssessmentType,
    pub weight_percentage: Option<i32>,
    /// `(score, total_points)`; score is `None` while withheld.
    pub submission: Option<(Option<i32>, i32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalScoreBreakdown {
    /// Average quiz percentage, 0–100.
    pub quiz_score: f64,
    /// Average final exam percentage, 0–100.
    pub final_exam_score: f64,
    pub total_score: i32,
    pub is_remedial: bool,
}

/// Blends quiz and final exam averages into the course score.
///
/// A completed remedial attempt caps the total at the remedial threshold.
pub fn aggregate(components: &[CourseComponent], remedial_completed: bool) -> FinalScoreBreakdown {
    let quiz_fraction = average_fraction(components, AssessmentType::Quiz);
    let exam_fraction = average_fraction(components, AssessmentType::FinalExam);

    let exam_weight = components
        .iter()
        .find(|c| c.assessment_type == AssessmentType::FinalExam)
        .map(|c| {
            c.weight_percentage
                .unwrap_or(DEFAULT_FINAL_EXAM_WEIGHT)
                .clamp(0, 100)
        })
        .unwrap_or(0);
    let quiz_weight = 100 - exam_weight;

    let blended = quiz_fraction * quiz_weight as f64 + exam_fraction * exam_weight as f64;
    let mut total_score = blended.round() as i32;
    if remedial_completed {
        total_score = total_score.min(REMEDIAL_THRESHOLD);
    }

    FinalScoreBreakdown {
        quiz_score: to_percent(quiz_fraction),
        final_exam_score: to_percent(exam_fraction),
        total_score,
        is_remedial: remedial_completed,
    }
}

/// Mean of score/total over submissions with a visible score, 0 if none.
fn average_fraction(components: &[CourseComponent], kind: AssessmentType) -> f64 {
    let fractions: Vec<f64> = components
        .iter()
        .filter(|c| c.assessment_type == kind)
        .filter_map(|c| match c.submission {
            Some((Some(score), total)) if total > 0 => {
                Some((score as f64 / total as f64).clamp(0.0, 1.0))
            }
            _ => None,
        })
        .collect();

    if fractions.is_empty() {
        0.0
    } else {
        fractions.iter().sum::<f64>() / fractions.len() as f64
    }
}

fn to_percent(fraction: f64) -> f64 {
    (fraction * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(score: i32, total: i32) -> CourseComponent {
        CourseComponent {
            assessment_type: AssessmentType::Quiz,
            weight_percentage: None,
            submission: Some((Some(score), total)),
        }
    }

    fn exam(weight: Option<i32>, submission: Option<(Option<i32>, i32)>) -> CourseComponent {
        CourseComponent {
            assessment_type: AssessmentType::FinalExam,
            weight_percentage: weight,
            submission,
        }
    }

    #[test]
    fn perfect_scores_give_full_marks() {
        let result = aggregate(&[quiz(10, 10), exam(Some(80), Some((Some(50), 50)))], false);
        assert_eq!(result.total_score, 100);
    }

    #[test]
    fn exam_weight_eighty_percent() {
        let result = aggregate(&[quiz(5, 10), exam(Some(80), Some((Some(50), 50)))], false);
        assert_eq!(result.quiz_score, 50.0);
        assert_eq!(result.final_exam_score, 100.0);
        assert_eq!(result.total_score, 90);
    }

    #[test]
    fn exam_weight_defaults_to_half() {
        let result = aggregate(&[quiz(6, 10), exam(None, Some((Some(10), 10)))], false);
        assert_eq!(result.total_score, 80);
    }

    #[test]
    fn quizzes_take_everything_without_final_exam() {
        let result = aggregate(&[quiz(7, 10), quiz(9, 10)], false);
        assert_eq!(result.quiz_score, 80.0);
        assert_eq!(result.final_exam_score, 0.0);
        assert_eq!(result.total_score, 80);
    }

    #[test]
    fn missing_or_withheld_exam_counts_as_zero() {
        let untaken = aggregate(&[quiz(10, 10), exam(Some(50), None)], false);
        assert_eq!(untaken.total_score, 50);

        let withheld = aggregate(&[quiz(10, 10), exam(Some(50), Some((None, 20)))], false);
        assert_eq!(withheld.total_score, 50);
    }

    #[test]
    fn practice_assessments_are_ignored() {
        let practice = CourseComponent {
            assessment_type: AssessmentType::Practice,
            weight_percentage: None,
            submission: Some((Some(0), 10)),
        };
        let result = aggregate(&[quiz(10, 10), practice], false);
        assert_eq!(result.total_score, 100);
    }

    #[test]
    fn remedial_caps_total() {
        let result = aggregate(&[quiz(10, 10), exam(Some(80), Some((Some(20), 20)))], true);
        assert_eq!(result.total_score, 65);
        assert!(result.is_remedial);

        let low = aggregate(&[quiz(2, 10), exam(Some(80), Some((Some(10), 20)))], true);
        assert_eq!(low.total_score, 44);
    }

    #[test]
    fn no_components_scores_zero() {
        let result = aggregate(&[], false);
        assert_eq!(result.total_score, 0);
    }
}
