// src/utils/permissions.rs

//! Authorization checks. Each takes the acting user's claims explicitly.

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{course::Course, user::Role},
    utils::jwt::Claims,
};

/// The acting user, resolved from claims once per request.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        Ok(Actor {
            user_id: claims.user_id()?,
            role: claims.role()?,
        })
    }
}

pub fn require_staff(actor: &Actor) -> Result<(), AppError> {
    if actor.role.is_staff() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Tutor or admin role required".to_string()))
    }
}

pub fn require_student(actor: &Actor) -> Result<(), AppError> {
    if actor.role == Role::Student {
        Ok(())
    } else {
        Err(AppError::Forbidden("Only students can do this".to_string()))
    }
}

/// Course owner or any admin.
pub fn is_course_staff(actor: &Actor, course: &Course) -> bool {
    actor.role == Role::Admin || (actor.role == Role::Tutor && course.tutor_id == actor.user_id)
}

pub async fn fetch_course(pool: &PgPool, course_id: i64) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>(
        "SELECT id, title, description, tutor_id, is_published, created_at FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

pub async fn ensure_course_staff(
    pool: &PgPool,
    actor: &Actor,
    course_id: i64,
) -> Result<Course, AppError> {
    let course = fetch_course(pool, course_id).await?;
    if is_course_staff(actor, &course) {
        Ok(course)
    } else {
        Err(AppError::Forbidden("Not a tutor of this course".to_string()))
    }
}

pub async fn is_enrolled(pool: &PgPool, user_id: i64, course_id: i64) -> Result<bool, AppError> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

pub async fn ensure_enrolled(pool: &PgPool, actor: &Actor, course_id: i64) -> Result<(), AppError> {
    if is_enrolled(pool, actor.user_id, course_id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not enrolled in this course".to_string()))
    }
}

/// Enrolled learners and course staff may view course content.
/// Returns whether the actor is staff, since staff also see unpublished items.
pub async fn ensure_course_access(
    pool: &PgPool,
    actor: &Actor,
    course_id: i64,
) -> Result<bool, AppError> {
    let course = fetch_course(pool, course_id).await?;
    if is_course_staff(actor, &course) {
        return Ok(true);
    }
    ensure_enrolled(pool, actor, course_id).await?;
    Ok(false)
}
