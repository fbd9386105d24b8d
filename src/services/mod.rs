// src/services/mod.rs

//! Database-backed workflows. Each public operation owns its transaction.

pub mod gamification;
pub mod grading;
pub mod powerups;
pub mod rewards;
