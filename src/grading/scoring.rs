// src/grading/scoring.rs

use serde::Serialize;
use serde_json::Value;

use crate::models::{
    assessment::AssessmentType,
    attempt::AnswerSheet,
    question::{AnswerConfig, Question},
};

/// Where a grading run comes from. Final exams only become graded
/// through a tutor review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingPath {
    AutoSubmit,
    TutorReview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub awarded: i32,
    pub points: i32,
    /// Essay without a manual grade yet.
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub score: i32,
    pub total_points: i32,
    pub is_graded: bool,
    pub results: Vec<QuestionResult>,
}

/// Scores one question. Returns the awarded points and whether the
/// question is still waiting for a manual grade.
pub fn score_question(question: &Question, answers: &AnswerSheet) -> (i32, bool) {
    let points = question.points.max(0);

    if let Some(grade) = answers.grade_override(question.id) {
        return (grade.clamp(0, points), false);
    }

    let response = answers.response(question.id);
    match &question.answer_config.0 {
        AnswerConfig::MultipleChoice { correct_index, .. } => {
            let chosen = response.and_then(choice_index);
            if chosen == Some(*correct_index) {
                (points, false)
            } else {
                (0, false)
            }
        }
        AnswerConfig::FillBlank { accepted_answers } => {
            let matched = response.and_then(text_value).is_some_and(|given| {
                let given = normalize(&given);
                accepted_answers.iter().any(|a| normalize(a) == given)
            });
            (if matched { points } else { 0 }, false)
        }
        AnswerConfig::Essay => (0, true),
    }
}

/// Scores every question of an attempt.
pub fn score_answers(questions: &[Question], answers: &AnswerSheet) -> ScoreOutcome {
    let mut score = 0;
    let mut total_points = 0;
    let mut pending_essays = false;
    let mut results = Vec::with_capacity(questions.len());

    for question in questions {
        let (awarded, pending) = score_question(question, answers);
        score += awarded;
        total_points += question.points.max(0);
        pending_essays |= pending;
        results.push(QuestionResult {
            question_id: question.id,
            awarded,
            points: question.points.max(0),
            pending,
        });
    }

    ScoreOutcome {
        score,
        total_points,
        is_graded: !pending_essays,
        results,
    }
}

/// Scores an attempt and applies the review policy: final exams stay
/// ungraded after auto-submit even without essays.
pub fn grade_attempt(
    assessment_type: AssessmentType,
    path: GradingPath,
    questions: &[Question],
    answers: &AnswerSheet,
) -> ScoreOutcome {
    let mut outcome = score_answers(questions, answers);
    if assessment_type == AssessmentType::FinalExam && path == GradingPath::AutoSubmit {
        outcome.is_graded = false;
    }
    outcome
}

fn choice_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|i| i as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
