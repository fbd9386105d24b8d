// src/handlers/attempts.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        attempt::{GradeAttemptRequest, SaveProgressRequest},
        powerup::{PowerupKind, UsePowerupRequest},
    },
    services::{
        grading::{self, fetch_assessment},
        powerups,
    },
    utils::{
        jwt::Claims,
        permissions::{Actor, ensure_enrolled, require_staff, require_student},
    },
};

fn created_or_ok(created: bool) -> StatusCode {
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

/// Starts a new attempt, or resumes the learner's open one.
/// Returns 201 when a new attempt was created, 200 when resumed.
pub async fn start(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(assessment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    require_student(&actor)?;
    let assessment = fetch_assessment(&pool, assessment_id).await?;
    ensure_enrolled(&pool, &actor, assessment.course_id).await?;

    let (view, created) = grading::start_attempt(&pool, &actor, assessment_id, Utc::now()).await?;
    Ok((created_or_ok(created), Json(view)))
}

/// Starts the one remedial attempt on a final exam.
pub async fn start_remedial(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(assessment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    require_student(&actor)?;
    let assessment = fetch_assessment(&pool, assessment_id).await?;
    ensure_enrolled(&pool, &actor, assessment.course_id).await?;

    let (view, created) =
        grading::start_remedial(&pool, &actor, assessment_id, Utc::now()).await?;
    Ok((created_or_ok(created), Json(view)))
}

pub async fn get_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let view = grading::view_attempt(&pool, &actor, id, Utc::now()).await?;
    Ok(Json(view))
}

/// Saves in-progress answers. Posted keys are merged into the stored sheet.
pub async fn save_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<SaveProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let view = grading::save_progress(&pool, &actor, id, payload.answers, Utc::now()).await?;
    Ok(Json(view))
}

pub async fn submit(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let view = grading::submit_attempt(&pool, &actor, id, Utc::now()).await?;

    tracing::info!(
        "User {} submitted attempt {} (score {:?}/{}, graded: {})",
        actor.user_id,
        view.attempt.id,
        view.attempt.score,
        view.attempt.total_points,
        view.attempt.is_graded
    );
    Ok(Json(view))
}

/// Records per-question grades from a tutor. An empty map confirms the
/// auto-scored result, which is how objective-only final exams get graded.
pub async fn grade(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<GradeAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    require_staff(&actor)?;
    grading::ensure_attempt_staff(&pool, &actor, id).await?;

    let view = grading::grade_attempt(&pool, id, &payload.grades, Utc::now()).await?;
    tracing::info!(
        "Tutor {} graded attempt {} -> {:?}/{}",
        actor.user_id,
        id,
        view.attempt.score,
        view.attempt.total_points
    );
    Ok(Json(view))
}

/// Uses a powerup on an open attempt. The body is optional, only 50-50
/// needs `question_id`.
pub async fn use_powerup(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((id, slug)): Path<(i64, String)>,
    payload: Option<Json<UsePowerupRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let kind = PowerupKind::try_from(slug)
        .map_err(|e| AppError::NotFound(format!("Powerup '{}' not found", e.0)))?;
    let req = payload.map(|Json(r)| r).unwrap_or_default();

    let outcome = powerups::use_powerup(&pool, &actor, id, kind, req, Utc::now()).await?;
    Ok(Json(outcome))
}
