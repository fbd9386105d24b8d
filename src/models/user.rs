// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::UnknownVariant;

/// Account role. Stored as lowercase text in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }

    /// Tutors and admins may author and grade assessments.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Tutor | Role::Admin)
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "student" => Ok(Role::Student),
            "tutor" => Ok(Role::Tutor),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownVariant(value)),
        }
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    #[sqlx(try_from = "String")]
    pub role: Role,

    pub xp: i64,
    pub points_balance: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<chrono::NaiveDate>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Achievement state as shown on the profile page.
#[derive(Debug, Serialize, FromRow)]
pub struct AchievementProgress {
    pub slug: String,
    pub name: String,
    pub target: i32,
    pub progress: i32,
    pub unlocked_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregated gamification profile for the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub xp: i64,
    pub level: i64,
    pub points_balance: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub achievements: Vec<AchievementProgress>,
}

/// DTO for creating a new user (Registration). Self-registered users are students.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
