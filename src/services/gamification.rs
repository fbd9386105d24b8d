// src/services/gamification.rs

//! XP, points, streaks and achievement progress.

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::{config::XP_PER_LEVEL, error::AppError, models::attempt::Attempt};

const ATTEMPT_SOURCE: &str = "assessment_attempt";
const ATTEMPT_REASON: &str = "assessment_completed";

pub fn level_for_xp(xp: i64) -> i64 {
    1 + xp.max(0) / XP_PER_LEVEL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streak {
    pub current: i32,
    pub longest: i32,
}

/// Daily streak after activity on `today`.
pub fn advance_streak(last_activity: Option<NaiveDate>, today: NaiveDate, streak: Streak) -> Streak {
    let current = match last_activity {
        Some(last) if last == today => streak.current.max(1),
        Some(last) if last.succ_opt() == Some(today) => streak.current + 1,
        _ => 1,
    };
    Streak {
        current,
        longest: streak.longest.max(current),
    }
}

/// Records learner activity for the streak counter.
pub async fn record_activity(
    conn: &mut PgConnection,
    user_id: i64,
    today: NaiveDate,
) -> Result<Streak, AppError> {
    let (last, current, longest): (Option<NaiveDate>, i32, i32) = sqlx::query_as(
        "SELECT last_activity_date, current_streak, longest_streak FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    let next = advance_streak(last, today, Streak { current, longest });

    sqlx::query(
        "UPDATE users SET last_activity_date = $2, current_streak = $3, longest_streak = $4 WHERE id = $1",
    )
    .bind(user_id)
    .bind(today)
    .bind(next.current)
    .bind(next.longest)
    .execute(&mut *conn)
    .await?;

    Ok(next)
}

/// Awards points and XP for a graded attempt, exactly once per attempt.
///
/// The unique `(source_type, source_id, reason)` key on point_transactions
/// is the guard: a second call finds the row and does nothing.
/// Returns the amount awarded, `None` if the attempt was already paid out.
pub async fn award_attempt(conn: &mut PgConnection, attempt: &Attempt) -> Result<Option<i64>, AppError> {
    if attempt.is_remedial || !attempt.is_graded || !attempt.is_completed() {
        return Ok(None);
    }

    let amount = attempt.score.unwrap_or(0).max(0) as i64;

    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO point_transactions (user_id, amount, reason, source_type, source_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (source_type, source_id, reason) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(attempt.user_id)
    .bind(amount)
    .bind(ATTEMPT_REASON)
    .bind(ATTEMPT_SOURCE)
    .bind(attempt.id)
    .fetch_optional(&mut *conn)
    .await?;

    if inserted.is_none() {
        tracing::debug!("Attempt {} already awarded, skipping", attempt.id);
        return Ok(None);
    }

    sqlx::query("UPDATE assessment_attempts SET points_awarded = $2 WHERE id = $1 AND points_awarded = 0")
        .bind(attempt.id)
        .bind(amount)
        .execute(&mut *conn)
        .await?;

    sqlx::query("UPDATE users SET xp = xp + $2, points_balance = points_balance + $2 WHERE id = $1")
        .bind(attempt.user_id)
        .bind(amount)
        .execute(&mut *conn)
        .await?;

    let perfect = attempt.total_points > 0 && attempt.score == Some(attempt.total_points);
    let mut unlocked = advance_achievements(&mut *conn, attempt.user_id, "assessments_completed").await?;
    if perfect {
        unlocked.extend(advance_achievements(&mut *conn, attempt.user_id, "perfect_scores").await?);
    }

    tracing::info!(
        "Awarded {} points to user {} for attempt {}",
        amount,
        attempt.user_id,
        attempt.id
    );
    for slug in unlocked {
        tracing::info!("User {} unlocked achievement '{}'", attempt.user_id, slug);
    }

    Ok(Some(amount))
}

/// Bumps progress on every achievement tracking `metric` and unlocks the
/// ones that reached their target. Returns newly unlocked slugs.
async fn advance_achievements(
    conn: &mut PgConnection,
    user_id: i64,
    metric: &str,
) -> Result<Vec<String>, AppError> {
    sqlx::query(
        r#"
        INSERT INTO user_achievements (user_id, achievement_id, progress)
        SELECT $1, id, 1 FROM achievements WHERE metric = $2
        ON CONFLICT (user_id, achievement_id)
        DO UPDATE SET progress = user_achievements.progress + 1
        "#,
    )
    .bind(user_id)
    .bind(metric)
    .execute(&mut *conn)
    .await?;

    let unlocked: Vec<String> = sqlx::query_scalar(
        r#"
        UPDATE user_achievements ua
        SET unlocked_at = CURRENT_TIMESTAMP
        FROM achievements a
        WHERE ua.achievement_id = a.id
          AND ua.user_id = $1
          AND a.metric = $2
          AND ua.unlocked_at IS NULL
          AND ua.progress >= a.target
        RETURNING a.slug
        "#,
    )
    .bind(user_id)
    .bind(metric)
    .fetch_all(&mut *conn)
    .await?;

    Ok(unlocked)
}
