// src/models/powerup.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::models::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    #[serde(rename = "50-50")]
    FiftyFifty,
    #[serde(rename = "extra-time")]
    ExtraTime,
}

impl PowerupKind {
    pub fn slug(&self) -> &'static str {
        match self {
            PowerupKind::FiftyFifty => "50-50",
            PowerupKind::ExtraTime => "extra-time",
        }
    }
}

impl TryFrom<String> for PowerupKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "50-50" => Ok(PowerupKind::FiftyFifty),
            "extra-time" => Ok(PowerupKind::ExtraTime),
            _ => Err(UnknownVariant(value)),
        }
    }
}

/// Tunables stored in `powerups.config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerupSettings {
    /// 50-50: number of incorrect options removed.
    pub remove_count: Option<usize>,
    /// extra-time: seconds added per use.
    pub seconds: Option<i32>,
}

/// A powerup allowed on an assessment, joined with its pivot row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllowedPowerup {
    pub powerup_id: i64,
    #[sqlx(try_from = "String")]
    pub slug: PowerupKind,
    pub name: String,
    pub config: Json<PowerupSettings>,
    /// Uses per attempt: the pivot override, else the powerup default.
    pub usage_limit: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AllowedPowerupEntry {
    #[validate(length(min = 1, max = 50))]
    pub slug: String,
    #[validate(range(min = 0, max = 100))]
    pub usage_limit: Option<i32>,
}

/// DTO replacing the allowed powerup set of an assessment.
#[derive(Debug, Deserialize, Validate)]
pub struct ConfigurePowerupsRequest {
    #[validate(nested)]
    pub powerups: Vec<AllowedPowerupEntry>,
}

/// DTO for using a powerup. `question_id` is required for 50-50.
#[derive(Debug, Default, Deserialize)]
pub struct UsePowerupRequest {
    pub question_id: Option<i64>,
}
