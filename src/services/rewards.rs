// src/services/rewards.rs

use sqlx::PgPool;

use crate::{
    error::AppError,
    grading::RuleViolation,
    models::reward::{Redemption, Reward},
};

/// Checks a redemption against the locked reward and balance.
pub fn check_redeemable(reward: &Reward, balance: i64) -> Result<(), RuleViolation> {
    if !reward.is_active {
        return Err(RuleViolation::RewardUnavailable);
    }
    if reward.stock <= 0 {
        return Err(RuleViolation::OutOfStock);
    }
    if balance < reward.cost {
        return Err(RuleViolation::InsufficientPoints {
            balance,
            cost: reward.cost,
        });
    }
    Ok(())
}

/// Redeems a reward. Runs in one transaction with the reward and user rows
/// locked, so concurrent redemptions cannot oversell stock or overdraw
/// points. Any rejection rolls back with nothing changed.
pub async fn redeem(pool: &PgPool, user_id: i64, reward_id: i64) -> Result<Redemption, AppError> {
    let mut tx = pool.begin().await?;

    let reward = sqlx::query_as::<_, Reward>(
        "SELECT id, name, description, cost, stock, is_active FROM rewards WHERE id = $1 FOR UPDATE",
    )
    .bind(reward_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Reward not found".to_string()))?;

    let balance: i64 =
        sqlx::query_scalar("SELECT points_balance FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    check_redeemable(&reward, balance)?;

    sqlx::query("UPDATE rewards SET stock = stock - 1 WHERE id = $1")
        .bind(reward.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE users SET points_balance = points_balance - $2 WHERE id = $1")
        .bind(user_id)
        .bind(reward.cost)
        .execute(&mut *tx)
        .await?;

    let redemption = sqlx::query_as::<_, Redemption>(
        r#"
        INSERT INTO reward_redemptions (user_id, reward_id, cost)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, reward_id, cost, redeemed_at
        "#,
    )
    .bind(user_id)
    .bind(reward.id)
    .bind(reward.cost)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO point_transactions (user_id, amount, reason, source_type, source_id)
        VALUES ($1, $2, 'reward_redeemed', 'reward_redemption', $3)
        "#,
    )
    .bind(user_id)
    .bind(-reward.cost)
    .bind(redemption.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "User {} redeemed reward {} for {} points",
        user_id,
        reward.id,
        reward.cost
    );
    Ok(redemption)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reward(cost: i64, stock: i32) -> Reward {
        Reward {
            id: 1,
            name: "Sticker pack".to_string(),
            description: None,
            cost,
            stock,
            is_active: true,
        }
    }

    #[test]
    fn redeemable_with_enough_points_and_stock() {
        assert_eq!(check_redeemable(&reward(50, 1), 50), Ok(()));
    }

    #[test]
    fn insufficient_points_is_rejected() {
        assert_eq!(
            check_redeemable(&reward(50, 3), 49),
            Err(RuleViolation::InsufficientPoints {
                balance: 49,
                cost: 50
            })
        );
    }

    #[test]
    fn empty_stock_is_rejected() {
        assert_eq!(check_redeemable(&reward(10, 0), 100), Err(RuleViolation::OutOfStock));
    }

    #[test]
    fn inactive_reward_is_rejected() {
        let mut r = reward(10, 5);
        r.is_active = false;
        assert_eq!(check_redeemable(&r, 100), Err(RuleViolation::RewardUnavailable));
    }
}
