// src/handlers/mod.rs

pub mod admin;
pub mod assessments;
pub mod attempts;
pub mod auth;
pub mod courses;
pub mod profile;
pub mod rewards;
