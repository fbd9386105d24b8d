// src/services/powerups.rs

use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use serde_json::json;
use sqlx::{PgPool, types::Json};

use crate::{
    error::{AppError, field_error},
    grading::{RuleViolation, lifecycle, powerups},
    models::{
        attempt::{Attempt, AttemptView},
        powerup::{AllowedPowerup, PowerupKind, UsePowerupRequest},
        question::Question,
    },
    services::grading::{
        ATTEMPT_COLUMNS, attempt_view, fetch_assessment, lock_attempt, view_attempt,
    },
    utils::permissions::Actor,
};

#[derive(Debug, Serialize)]
pub struct PowerupOutcome {
    pub powerup: PowerupKind,
    pub details: serde_json::Value,
    pub attempt: AttemptView,
}

pub async fn allowed_powerups(
    pool: &PgPool,
    assessment_id: i64,
) -> Result<Vec<AllowedPowerup>, AppError> {
    let allowed = sqlx::query_as::<_, AllowedPowerup>(
        r#"
        SELECT p.id AS powerup_id, p.slug, p.name, p.config,
               COALESCE(ap.usage_limit, p.default_limit) AS usage_limit
        FROM assessment_powerups ap
        JOIN powerups p ON p.id = ap.powerup_id
        WHERE ap.assessment_id = $1
        ORDER BY p.id
        "#,
    )
    .bind(assessment_id)
    .fetch_all(pool)
    .await?;
    Ok(allowed)
}

/// Applies a powerup to the learner's open attempt.
pub async fn use_powerup(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: i64,
    kind: PowerupKind,
    req: UsePowerupRequest,
    now: DateTime<Utc>,
) -> Result<PowerupOutcome, AppError> {
    let mut tx = pool.begin().await?;

    let attempt = lock_attempt(&mut tx, attempt_id).await?;

    if attempt.user_id != actor.user_id {
        return Err(AppError::Forbidden("Not your attempt".to_string()));
    }
    let assessment = fetch_assessment(&mut *tx, attempt.assessment_id).await?;

    if lifecycle::is_expired(&attempt, assessment.time_limit_minutes, now) {
        // Reading the attempt auto-submits it.
        drop(tx);
        view_attempt(pool, actor, attempt_id, now).await?;
        return Err(RuleViolation::AttemptExpired.into());
    }

    let allowed = sqlx::query_as::<_, AllowedPowerup>(
        r#"
        SELECT p.id AS powerup_id, p.slug, p.name, p.config,
               COALESCE(ap.usage_limit, p.default_limit) AS usage_limit
        FROM assessment_powerups ap
        JOIN powerups p ON p.id = ap.powerup_id
        WHERE ap.assessment_id = $1 AND p.slug = $2
        "#,
    )
    .bind(assessment.id)
    .bind(kind.slug())
    .fetch_optional(&mut *tx)
    .await?;

    let used: i64 = match &allowed {
        Some(entry) => {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM attempt_powerup_usages WHERE attempt_id = $1 AND powerup_id = $2",
            )
            .bind(attempt.id)
            .bind(entry.powerup_id)
            .fetch_one(&mut *tx)
            .await?
        }
        None => 0,
    };

    powerups::check_usable(kind, &assessment, &attempt, allowed.as_ref(), used, now)?;
    // check_usable rejects a missing entry.
    let Some(allowed) = allowed else {
        return Err(RuleViolation::PowerupNotAllowed(kind.slug().to_string()).into());
    };

    let details = match kind {
        PowerupKind::FiftyFifty => {
            let question_id = req.question_id.ok_or_else(|| {
                field_error(
                    "question_id",
                    "required",
                    "question_id is required for 50-50".to_string(),
                )
            })?;

            let question = sqlx::query_as::<_, Question>(
                r#"
                SELECT id, assessment_id, content, answer_config, points, position
                FROM assessment_questions
                WHERE id = $1 AND assessment_id = $2
                "#,
            )
            .bind(question_id)
            .bind(assessment.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

            let already_reduced: bool = sqlx::query_scalar(
                r#"
                SELECT EXISTS (
                    SELECT 1 FROM attempt_powerup_usages
                    WHERE attempt_id = $1 AND powerup_id = $2
                      AND (details->>'question_id')::BIGINT = $3
                )
                "#,
            )
            .bind(attempt.id)
            .bind(allowed.powerup_id)
            .bind(question_id)
            .fetch_one(&mut *tx)
            .await?;

            let mut rng = StdRng::from_entropy();
            let removed = powerups::fifty_fifty(
                &question,
                &attempt,
                already_reduced,
                allowed.config.remove_count,
                &mut rng,
            )?;
            json!({ "question_id": question_id, "removed_options": removed })
        }
        PowerupKind::ExtraTime => {
            let seconds = powerups::extra_time(&assessment, allowed.config.seconds)?;
            sqlx::query(
                "UPDATE assessment_attempts SET time_extension = time_extension + $2 WHERE id = $1",
            )
            .bind(attempt.id)
            .bind(seconds)
            .execute(&mut *tx)
            .await?;
            json!({ "seconds": seconds })
        }
    };

    sqlx::query(
        "INSERT INTO attempt_powerup_usages (attempt_id, powerup_id, details) VALUES ($1, $2, $3)",
    )
    .bind(attempt.id)
    .bind(allowed.powerup_id)
    .bind(Json(&details))
    .execute(&mut *tx)
    .await?;

    let sql = format!("SELECT {ATTEMPT_COLUMNS} FROM assessment_attempts WHERE id = $1");
    let refreshed = sqlx::query_as::<_, Attempt>(&sql)
        .bind(attempt.id)
        .fetch_one(&mut *tx)
        .await?;
    let view = attempt_view(&mut *tx, refreshed, assessment.time_limit_minutes).await?;
    tx.commit().await?;

    tracing::info!(
        "User {} used powerup '{}' on attempt {}",
        actor.user_id,
        kind.slug(),
        attempt.id
    );

    Ok(PowerupOutcome {
        powerup: kind,
        details,
        attempt: view,
    })
}
