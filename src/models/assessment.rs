// src/models/assessment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::models::{UnknownVariant, question::PublicQuestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Practice,
    Quiz,
    FinalExam,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Practice => "practice",
            AssessmentType::Quiz => "quiz",
            AssessmentType::FinalExam => "final_exam",
        }
    }
}

impl TryFrom<String> for AssessmentType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "practice" => Ok(AssessmentType::Practice),
            "quiz" => Ok(AssessmentType::Quiz),
            "final_exam" => Ok(AssessmentType::FinalExam),
            _ => Err(UnknownVariant(value)),
        }
    }
}

/// Represents the 'assessments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assessment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,

    /// Mapped from the column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub assessment_type: AssessmentType,

    pub max_score: i32,
    pub allow_retakes: bool,

    /// Upper bound on regular (non-remedial) attempts. `None` means unlimited.
    pub max_attempts: Option<i32>,

    pub time_limit_minutes: Option<i32>,

    /// Share of the course score, final exams only.
    pub weight_percentage: Option<i32>,

    pub is_published: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Assessment {
    pub fn is_final_exam(&self) -> bool {
        self.assessment_type == AssessmentType::FinalExam
    }
}

/// Assessment with its questions, answer keys stripped.
#[derive(Debug, Serialize)]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for creating an assessment inside a course.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_exam_weight))]
pub struct CreateAssessmentRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(rename = "type")]
    pub assessment_type: AssessmentType,
    #[validate(range(min = 0, max = 10000))]
    pub max_score: i32,
    #[serde(default)]
    pub allow_retakes: bool,
    #[validate(range(min = 1, max = 100))]
    pub max_attempts: Option<i32>,
    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,
    #[validate(range(min = 1, max = 100))]
    pub weight_percentage: Option<i32>,
}

/// Only final exams carry a weight.
fn validate_exam_weight(req: &CreateAssessmentRequest) -> Result<(), ValidationError> {
    if req.weight_percentage.is_some() && req.assessment_type != AssessmentType::FinalExam {
        let mut err = ValidationError::new("weight_only_for_final_exam");
        err.message = Some("weight_percentage applies to final exams only".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub is_published: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: AssessmentType, weight: Option<i32>) -> CreateAssessmentRequest {
        CreateAssessmentRequest {
            title: "Unit 1".to_string(),
            assessment_type: kind,
            max_score: 100,
            allow_retakes: false,
            max_attempts: None,
            time_limit_minutes: Some(30),
            weight_percentage: weight,
        }
    }

    #[test]
    fn weight_is_accepted_on_final_exam() {
        assert!(request(AssessmentType::FinalExam, Some(80)).validate().is_ok());
    }

    #[test]
    fn weight_is_rejected_on_quiz() {
        assert!(request(AssessmentType::Quiz, Some(80)).validate().is_err());
    }

    #[test]
    fn weight_out_of_range_is_rejected() {
        assert!(request(AssessmentType::FinalExam, Some(120)).validate().is_err());
    }

    #[test]
    fn type_round_trips_through_text_column() {
        for kind in [
            AssessmentType::Practice,
            AssessmentType::Quiz,
            AssessmentType::FinalExam,
        ] {
            assert_eq!(AssessmentType::try_from(kind.as_str().to_string()).unwrap(), kind);
        }
        assert!(AssessmentType::try_from("exam".to_string()).is_err());
    }
}
