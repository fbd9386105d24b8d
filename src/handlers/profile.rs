// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::auth::USER_COLUMNS,
    models::{
        reward::{LedgerParams, PointTransaction},
        user::{AchievementProgress, MeResponse, User},
    },
    services::gamification::level_for_xp,
    utils::jwt::Claims,
};

/// Get current user's profile and gamification state.
pub async fn get_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    // Every achievement is listed, with zero progress if never started.
    let achievements = sqlx::query_as::<_, AchievementProgress>(
        r#"
        SELECT a.slug, a.name, a.target,
               COALESCE(ua.progress, 0) AS progress,
               ua.unlocked_at
        FROM achievements a
        LEFT JOIN user_achievements ua ON ua.achievement_id = a.id AND ua.user_id = $1
        ORDER BY a.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        level: level_for_xp(user.xp),
        xp: user.xp,
        points_balance: user.points_balance,
        current_streak: user.current_streak,
        longest_streak: user.longest_streak,
        achievements,
    }))
}

/// The current user's points ledger, newest first.
pub async fn list_my_points(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<LedgerParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let entries = sqlx::query_as::<_, PointTransaction>(
        r#"
        SELECT id, amount, reason, source_type, source_id, created_at
        FROM point_transactions
        WHERE user_id = $1
          AND ($2::BIGINT IS NULL OR id < $2)
        ORDER BY id DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(params.before)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(entries))
}
