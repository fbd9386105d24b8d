// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::{Validate, ValidationError};

/// How a question is answered and, for objective types, its answer key.
/// Stored as JSONB in `assessment_questions.answer_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerConfig {
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    FillBlank {
        accepted_answers: Vec<String>,
    },
    Essay,
}

impl AnswerConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerConfig::MultipleChoice { .. } => "multiple_choice",
            AnswerConfig::FillBlank { .. } => "fill_blank",
            AnswerConfig::Essay => "essay",
        }
    }
}

/// Represents the 'assessment_questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub assessment_id: i64,
    pub content: String,
    pub answer_config: Json<AnswerConfig>,
    pub points: i32,
    pub position: i32,
}

/// DTO for sending a question to a learner (no answer key).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub points: i32,
    pub position: i32,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        let question_type = q.answer_config.kind();
        let options = match q.answer_config.0 {
            AnswerConfig::MultipleChoice { options, .. } => Some(options),
            _ => None,
        };
        PublicQuestion {
            id: q.id,
            question_type,
            content: q.content,
            options,
            points: q.points,
            position: q.position,
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    #[validate(custom(function = validate_answer_config))]
    pub answer_config: AnswerConfig,
    #[validate(range(min = 0, max = 1000))]
    pub points: i32,
    /// Defaults to the end of the question list.
    pub position: Option<i32>,
}

fn validate_answer_config(config: &AnswerConfig) -> Result<(), ValidationError> {
    match config {
        AnswerConfig::MultipleChoice {
            options,
            correct_index,
        } => {
            if options.len() < 2 {
                return Err(ValidationError::new("too_few_options"));
            }
            if options.iter().any(|o| o.len() > 500) {
                return Err(ValidationError::new("option_too_long"));
            }
            if *correct_index >= options.len() {
                return Err(ValidationError::new("correct_index_out_of_range"));
            }
        }
        AnswerConfig::FillBlank { accepted_answers } => {
            if accepted_answers.iter().all(|a| a.trim().is_empty()) {
                return Err(ValidationError::new("accepted_answers_cannot_be_empty"));
            }
        }
        AnswerConfig::Essay => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_config_is_tagged_by_kind() {
        let config: AnswerConfig = serde_json::from_value(serde_json::json!({
            "kind": "multiple_choice",
            "options": ["a", "b", "c"],
            "correct_index": 1
        }))
        .unwrap();
        assert_eq!(
            config,
            AnswerConfig::MultipleChoice {
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_index: 1
            }
        );

        let essay: AnswerConfig =
            serde_json::from_value(serde_json::json!({ "kind": "essay" })).unwrap();
        assert_eq!(essay, AnswerConfig::Essay);
    }

    #[test]
    fn correct_index_must_point_at_an_option() {
        let req = CreateQuestionRequest {
            content: "2 + 2?".to_string(),
            answer_config: AnswerConfig::MultipleChoice {
                options: vec!["3".into(), "4".into()],
                correct_index: 2,
            },
            points: 5,
            position: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn public_question_hides_answer_key() {
        let q = Question {
            id: 7,
            assessment_id: 1,
            content: "Capital of France?".to_string(),
            answer_config: Json(AnswerConfig::FillBlank {
                accepted_answers: vec!["Paris".into()],
            }),
            points: 2,
            position: 1,
        };
        let public = serde_json::to_value(PublicQuestion::from(q)).unwrap();
        assert_eq!(public["type"], "fill_blank");
        assert!(public.get("options").is_none());
        assert!(!public.to_string().contains("Paris"));
    }
}
