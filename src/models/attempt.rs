// src/models/attempt.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, types::Json};

use crate::grading::lifecycle::AttemptStatus;

const GRADE_SUFFIX: &str = "_grade";

/// Answers stored on an attempt: question id → submitted value, plus
/// `{question_id}_grade` entries holding a tutor's manual grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<String, Value>);

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The learner's response to a question. Null and empty strings count as unanswered.
    pub fn response(&self, question_id: i64) -> Option<&Value> {
        match self.0.get(&question_id.to_string()) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        }
    }

    pub fn is_answered(&self, question_id: i64) -> bool {
        self.response(question_id).is_some()
    }

    pub fn set_response(&mut self, question_id: i64, value: Value) {
        self.0.insert(question_id.to_string(), value);
    }

    /// Manual grade recorded for a question, if any.
    pub fn grade_override(&self, question_id: i64) -> Option<i32> {
        let value = self.0.get(&format!("{question_id}{GRADE_SUFFIX}"))?;
        match value {
            Value::Number(n) => n.as_f64().map(|f| f.round() as i32),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i32),
            _ => None,
        }
    }

    pub fn set_grade(&mut self, question_id: i64, grade: i32) {
        self.0
            .insert(format!("{question_id}{GRADE_SUFFIX}"), Value::from(grade));
    }

    /// True when the key names a grade override rather than a response.
    pub fn is_grade_key(key: &str) -> bool {
        key.ends_with(GRADE_SUFFIX)
    }
}

impl From<BTreeMap<String, Value>> for AnswerSheet {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Represents the 'assessment_attempts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub assessment_id: i64,
    pub user_id: i64,
    pub answers: Json<AnswerSheet>,
    pub score: Option<i32>,
    pub total_points: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_graded: bool,
    pub is_remedial: bool,
    pub points_awarded: i64,
    /// Extra seconds granted by powerups.
    pub time_extension: i32,
}

impl Attempt {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Attempt as returned to clients, with derived lifecycle fields.
#[derive(Debug, Serialize)]
pub struct AttemptView {
    #[serde(flatten)]
    pub attempt: Attempt,
    pub status: AttemptStatus,
    pub deadline: Option<DateTime<Utc>>,
    /// 50-50 removals so far, question id → removed option indices.
    pub removed_options: HashMap<i64, Vec<usize>>,
}

/// DTO for saving in-progress answers. Keys are question ids.
#[derive(Debug, Deserialize)]
pub struct SaveProgressRequest {
    pub answers: BTreeMap<String, Value>,
}

/// DTO for a tutor grading essay questions on a completed attempt.
#[derive(Debug, Deserialize)]
pub struct GradeAttemptRequest {
    /// Question id → awarded points.
    pub grades: HashMap<i64, i32>,
}
