// src/handlers/courses.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        assessment::{Assessment, CreateAssessmentRequest},
        course::{Course, CreateCourseRequest},
        submission::{FinalScore, GradebookEntry, GradebookResponse},
    },
    services::grading::{ASSESSMENT_COLUMNS, FINAL_SCORE_COLUMNS, fetch_final_score},
    utils::{
        jwt::Claims,
        permissions::{
            Actor, ensure_course_access, ensure_course_staff, ensure_enrolled, fetch_course,
            require_staff, require_student,
        },
    },
};

/// Lists published courses, plus the caller's own courses for tutors.
pub async fn list_courses(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;

    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, tutor_id, is_published, created_at
        FROM courses
        WHERE is_published OR tutor_id = $1
        ORDER BY id
        "#,
    )
    .bind(actor.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(courses))
}

/// Creates a course owned by the calling tutor.
pub async fn create_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    require_staff(&actor)?;
    payload.validate()?;

    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (title, description, tutor_id, is_published)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, description, tutor_id, is_published, created_at
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(actor.user_id)
    .bind(payload.is_published)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Tutor {} created course {}", actor.user_id, course.id);
    Ok((StatusCode::CREATED, Json(course)))
}

/// Enrolls the calling student. Enrolling twice is a no-op.
pub async fn enroll(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    require_student(&actor)?;

    let course = fetch_course(&pool, course_id).await?;
    if !course.is_published {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let result = sqlx::query(
        "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(actor.user_id)
    .bind(course_id)
    .execute(&pool)
    .await?;

    let status = if result.rows_affected() > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(serde_json::json!({ "course_id": course_id, "enrolled": true })),
    ))
}

/// Lists a course's assessments. Learners see published ones only.
pub async fn list_assessments(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let is_staff = ensure_course_access(&pool, &actor, course_id).await?;

    let sql = format!(
        "SELECT {ASSESSMENT_COLUMNS} FROM assessments \
         WHERE course_id = $1 AND (is_published OR $2) ORDER BY id"
    );
    let assessments = sqlx::query_as::<_, Assessment>(&sql)
        .bind(course_id)
        .bind(is_staff)
        .fetch_all(&pool)
        .await?;

    Ok(Json(assessments))
}

/// Creates an unpublished assessment in a course.
pub async fn create_assessment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CreateAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    ensure_course_staff(&pool, &actor, course_id).await?;
    payload.validate()?;

    let sql = format!(
        "INSERT INTO assessments \
         (course_id, title, type, max_score, allow_retakes, max_attempts, time_limit_minutes, weight_percentage) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ASSESSMENT_COLUMNS}"
    );
    let assessment = sqlx::query_as::<_, Assessment>(&sql)
        .bind(course_id)
        .bind(&payload.title)
        .bind(payload.assessment_type.as_str())
        .bind(payload.max_score)
        .bind(payload.allow_retakes)
        .bind(payload.max_attempts)
        .bind(payload.time_limit_minutes)
        .bind(payload.weight_percentage)
        .fetch_one(&pool)
        .await?;

    tracing::info!(
        "Created {} assessment {} in course {}",
        assessment.assessment_type.as_str(),
        assessment.id,
        course_id
    );
    Ok((StatusCode::CREATED, Json(assessment)))
}

/// The caller's final score in a course.
pub async fn get_final_score(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    ensure_enrolled(&pool, &actor, course_id).await?;

    let score = fetch_final_score(&pool, actor.user_id, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No final score yet".to_string()))?;

    Ok(Json(score))
}

/// Submissions and final scores of every learner in a course.
pub async fn gradebook(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    ensure_course_staff(&pool, &actor, course_id).await?;

    let submissions = sqlx::query_as::<_, GradebookEntry>(
        r#"
        SELECT s.assessment_id, a.title AS assessment_title, s.user_id, u.username,
               s.score, s.total_points, s.is_graded
        FROM assessment_submissions s
        JOIN assessments a ON a.id = s.assessment_id
        JOIN users u ON u.id = s.user_id
        WHERE a.course_id = $1
        ORDER BY u.username, a.id
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    let sql = format!(
        "SELECT {FINAL_SCORE_COLUMNS} FROM final_scores WHERE course_id = $1 ORDER BY user_id"
    );
    let final_scores = sqlx::query_as::<_, FinalScore>(&sql)
        .bind(course_id)
        .fetch_all(&pool)
        .await?;

    Ok(Json(GradebookResponse {
        submissions,
        final_scores,
    }))
}
