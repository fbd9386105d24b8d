// src/handlers/rewards.rs

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
    models::reward::{CreateRewardRequest, Reward},
    services::rewards,
    utils::jwt::Claims,
};

/// Lists active rewards, cheapest first.
pub async fn list_rewards(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let rewards = sqlx::query_as::<_, Reward>(
        r#"
        SELECT id, name, description, cost, stock, is_active
        FROM rewards
        WHERE is_active
        ORDER BY cost, id
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(rewards))
}

/// Spends points on a reward.
pub async fn redeem(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(reward_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let redemption = rewards::redeem(&pool, user_id, reward_id).await?;
    Ok((StatusCode::CREATED, Json(redemption)))
}

/// Adds a reward to the catalog.
/// Admin only.
pub async fn create_reward(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateRewardRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reward = sqlx::query_as::<_, Reward>(
        r#"
        INSERT INTO rewards (name, description, cost, stock)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, description, cost, stock, is_active
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.cost)
    .bind(payload.stock)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Created reward {} '{}'", reward.id, reward.name);
    Ok((StatusCode::CREATED, Json(reward)))
}
