// src/models/mod.rs

pub mod assessment;
pub mod attempt;
pub mod course;
pub mod powerup;
pub mod question;
pub mod reward;
pub mod submission;
pub mod user;

/// Returned when a text column holds a value outside a Rust enum.
#[derive(Debug, thiserror::Error)]
#[error("unknown variant '{0}'")]
pub struct UnknownVariant(pub String);
