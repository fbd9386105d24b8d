// src/services/grading.rs

//! Database side of the grading pipeline: loading rows, persisting
//! attempt results, syncing the gradebook and recomputing final scores.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgConnection, PgPool, postgres::PgExecutor, types::Json};

use crate::{
    error::{AppError, field_error},
    grading::{
        RuleViolation,
        final_score::{self, CourseComponent},
        lifecycle::{self, StartDecision},
        scoring::{self, GradingPath},
        submission,
    },
    models::{
        assessment::{Assessment, AssessmentType},
        attempt::{AnswerSheet, Attempt, AttemptView},
        question::{AnswerConfig, Question},
        submission::FinalScore,
    },
    services::gamification,
    utils::{
        html::clean_html,
        permissions::{Actor, ensure_course_staff},
    },
};

pub const ASSESSMENT_COLUMNS: &str = "id, course_id, title, type, max_score, allow_retakes, \
     max_attempts, time_limit_minutes, weight_percentage, is_published, created_at";

pub const ATTEMPT_COLUMNS: &str = "id, assessment_id, user_id, answers, score, total_points, \
     started_at, completed_at, is_graded, is_remedial, points_awarded, time_extension";

pub const FINAL_SCORE_COLUMNS: &str =
    "user_id, course_id, quiz_score, final_exam_score, total_score, is_remedial, updated_at";

pub async fn fetch_assessment<'e>(
    db: impl PgExecutor<'e>,
    assessment_id: i64,
) -> Result<Assessment, AppError> {
    let sql = format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = $1");
    sqlx::query_as::<_, Assessment>(&sql)
        .bind(assessment_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))
}

pub async fn fetch_questions<'e>(
    db: impl PgExecutor<'e>,
    assessment_id: i64,
) -> Result<Vec<Question>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, assessment_id, content, answer_config, points, position
        FROM assessment_questions
        WHERE assessment_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(assessment_id)
    .fetch_all(db)
    .await?;
    Ok(questions)
}

pub async fn fetch_final_score<'e>(
    db: impl PgExecutor<'e>,
    user_id: i64,
    course_id: i64,
) -> Result<Option<FinalScore>, AppError> {
    let sql =
        format!("SELECT {FINAL_SCORE_COLUMNS} FROM final_scores WHERE user_id = $1 AND course_id = $2");
    let row = sqlx::query_as::<_, FinalScore>(&sql)
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Locks a learner's `users` row. Transactions that write attempts take
/// this lock before any attempt row lock.
async fn lock_user(conn: &mut PgConnection, user_id: i64) -> Result<(), AppError> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Loads an attempt and locks it for the rest of the transaction, after
/// locking its owner's `users` row.
pub(crate) async fn lock_attempt(
    conn: &mut PgConnection,
    attempt_id: i64,
) -> Result<Attempt, AppError> {
    sqlx::query(
        r#"
        SELECT u.id
        FROM users u
        JOIN assessment_attempts t ON t.user_id = u.id
        WHERE t.id = $1
        FOR UPDATE OF u
        "#,
    )
    .bind(attempt_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

    let sql = format!("SELECT {ATTEMPT_COLUMNS} FROM assessment_attempts WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Attempt>(&sql)
        .bind(attempt_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))
}

async fn user_attempts(
    conn: &mut PgConnection,
    user_id: i64,
    assessment_id: i64,
    remedial: Option<bool>,
) -> Result<Vec<Attempt>, AppError> {
    let sql = format!(
        "SELECT {ATTEMPT_COLUMNS} FROM assessment_attempts \
         WHERE user_id = $1 AND assessment_id = $2 AND ($3::BOOLEAN IS NULL OR is_remedial = $3) \
         ORDER BY id"
    );
    let attempts = sqlx::query_as::<_, Attempt>(&sql)
        .bind(user_id)
        .bind(assessment_id)
        .bind(remedial)
        .fetch_all(&mut *conn)
        .await?;
    Ok(attempts)
}

/// 50-50 removals recorded on an attempt, question id → removed options.
pub async fn removed_options<'e>(
    db: impl PgExecutor<'e>,
    attempt_id: i64,
) -> Result<HashMap<i64, Vec<usize>>, AppError> {
    let rows: Vec<(Json<serde_json::Value>,)> = sqlx::query_as(
        r#"
        SELECT u.details
        FROM attempt_powerup_usages u
        JOIN powerups p ON p.id = u.powerup_id
        WHERE u.attempt_id = $1 AND p.slug = '50-50'
        "#,
    )
    .bind(attempt_id)
    .fetch_all(db)
    .await?;

    let mut removed = HashMap::new();
    for (Json(details),) in rows {
        let question_id = details.get("question_id").and_then(|v| v.as_i64());
        let options: Option<Vec<usize>> = details
            .get("removed_options")
            .and_then(|v| serde_json::from_value(v.clone()).ok());
        if let (Some(question_id), Some(options)) = (question_id, options) {
            removed.insert(question_id, options);
        }
    }
    Ok(removed)
}

pub async fn attempt_view<'e>(
    db: impl PgExecutor<'e>,
    attempt: Attempt,
    time_limit_minutes: Option<i32>,
) -> Result<AttemptView, AppError> {
    let removed_options = removed_options(db, attempt.id).await?;
    Ok(AttemptView {
        status: lifecycle::status(Some(&attempt)),
        deadline: lifecycle::deadline(&attempt, time_limit_minutes),
        removed_options,
        attempt,
    })
}

/// Scores an attempt, stores the result and runs the grade-event
/// follow-ups. Marks the attempt completed if it was not already.
async fn finalize_attempt(
    conn: &mut PgConnection,
    assessment: &Assessment,
    attempt: &Attempt,
    path: GradingPath,
    now: DateTime<Utc>,
) -> Result<Attempt, AppError> {
    let questions = fetch_questions(&mut *conn, assessment.id).await?;
    let outcome = scoring::grade_attempt(
        assessment.assessment_type,
        path,
        &questions,
        &attempt.answers.0,
    );
    let newly_completed = !attempt.is_completed();

    let sql = format!(
        "UPDATE assessment_attempts \
         SET answers = $2, score = $3, total_points = $4, is_graded = $5, \
             completed_at = COALESCE(completed_at, $6) \
         WHERE id = $1 RETURNING {ATTEMPT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Attempt>(&sql)
        .bind(attempt.id)
        .bind(Json(&attempt.answers.0))
        .bind(outcome.score)
        .bind(outcome.total_points)
        .bind(outcome.is_graded)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

    tracing::info!(
        "Attempt {} scored {}/{} (graded: {})",
        updated.id,
        outcome.score,
        outcome.total_points,
        outcome.is_graded
    );

    if newly_completed {
        gamification::record_activity(&mut *conn, updated.user_id, now.date_naive()).await?;
    }

    on_grade_event(conn, assessment, updated).await
}

/// Follow-ups of every grade event: sync the gradebook row, recompute the
/// course final score and pay out points once the attempt is graded.
async fn on_grade_event(
    conn: &mut PgConnection,
    assessment: &Assessment,
    mut attempt: Attempt,
) -> Result<Attempt, AppError> {
    sync_submission(&mut *conn, assessment, attempt.user_id).await?;
    recompute_final_score(&mut *conn, attempt.user_id, assessment.course_id).await?;

    if let Some(amount) = gamification::award_attempt(&mut *conn, &attempt).await? {
        attempt.points_awarded = amount;
    }
    Ok(attempt)
}

/// Rewrites the (assessment, user) gradebook row from all attempts.
pub async fn sync_submission(
    conn: &mut PgConnection,
    assessment: &Assessment,
    user_id: i64,
) -> Result<(), AppError> {
    let attempts = user_attempts(&mut *conn, user_id, assessment.id, None).await?;
    let Some(synced) = submission::sync_submission(assessment, &attempts) else {
        return Ok(());
    };

    sqlx::query(
        r#"
        INSERT INTO assessment_submissions (assessment_id, user_id, attempt_id, score, total_points, is_graded)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (assessment_id, user_id) DO UPDATE SET
            attempt_id = EXCLUDED.attempt_id,
            score = EXCLUDED.score,
            total_points = EXCLUDED.total_points,
            is_graded = EXCLUDED.is_graded,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(assessment.id)
    .bind(user_id)
    .bind(synced.attempt_id)
    .bind(synced.score)
    .bind(synced.total_points)
    .bind(synced.is_graded)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[derive(sqlx::FromRow)]
struct ComponentRow {
    #[sqlx(rename = "type", try_from = "String")]
    assessment_type: AssessmentType,
    weight_percentage: Option<i32>,
    score: Option<i32>,
    total_points: Option<i32>,
}

/// Recomputes the (user, course) final score from scratch and upserts it.
pub async fn recompute_final_score(
    conn: &mut PgConnection,
    user_id: i64,
    course_id: i64,
) -> Result<FinalScore, AppError> {
    let rows = sqlx::query_as::<_, ComponentRow>(
        r#"
        SELECT a.type, a.weight_percentage, s.score, s.total_points
        FROM assessments a
        LEFT JOIN assessment_submissions s ON s.assessment_id = a.id AND s.user_id = $1
        WHERE a.course_id = $2
          AND a.is_published
          AND a.type IN ('quiz', 'final_exam')
        ORDER BY a.id
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await?;

    let components: Vec<CourseComponent> = rows
        .into_iter()
        .map(|r| CourseComponent {
            assessment_type: r.assessment_type,
            weight_percentage: r.weight_percentage,
            submission: r.total_points.map(|total| (r.score, total)),
        })
        .collect();

    let remedial_completed: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM assessment_attempts t
            JOIN assessments a ON a.id = t.assessment_id
            WHERE t.user_id = $1
              AND a.course_id = $2
              AND a.type = 'final_exam'
              AND t.is_remedial
              AND t.completed_at IS NOT NULL
        )
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(&mut *conn)
    .await?;

    let breakdown = final_score::aggregate(&components, remedial_completed);

    let sql = format!(
        "INSERT INTO final_scores (user_id, course_id, quiz_score, final_exam_score, total_score, is_remedial) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (user_id, course_id) DO UPDATE SET \
             quiz_score = EXCLUDED.quiz_score, \
             final_exam_score = EXCLUDED.final_exam_score, \
             total_score = EXCLUDED.total_score, \
             is_remedial = EXCLUDED.is_remedial, \
             updated_at = CURRENT_TIMESTAMP \
         RETURNING {FINAL_SCORE_COLUMNS}"
    );
    let stored = sqlx::query_as::<_, FinalScore>(&sql)
        .bind(user_id)
        .bind(course_id)
        .bind(breakdown.quiz_score)
        .bind(breakdown.final_exam_score)
        .bind(breakdown.total_score)
        .bind(breakdown.is_remedial)
        .fetch_one(&mut *conn)
        .await?;

    tracing::debug!(
        "Final score for user {} in course {}: {}",
        user_id,
        course_id,
        stored.total_score
    );
    Ok(stored)
}

/// Auto-submits every expired in-progress attempt in the list, in place.
async fn close_expired(
    conn: &mut PgConnection,
    assessment: &Assessment,
    attempts: &mut [Attempt],
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    for attempt in attempts.iter_mut() {
        if lifecycle::is_expired(attempt, assessment.time_limit_minutes, now) {
            tracing::info!("Attempt {} expired, auto-submitting", attempt.id);
            *attempt =
                finalize_attempt(&mut *conn, assessment, attempt, GradingPath::AutoSubmit, now).await?;
        }
    }
    Ok(())
}

async fn insert_attempt(
    conn: &mut PgConnection,
    assessment: &Assessment,
    user_id: i64,
    remedial: bool,
    now: DateTime<Utc>,
) -> Result<Attempt, AppError> {
    let total_points: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(points), 0)::BIGINT FROM assessment_questions WHERE assessment_id = $1",
    )
    .bind(assessment.id)
    .fetch_one(&mut *conn)
    .await?;

    let sql = format!(
        "INSERT INTO assessment_attempts (assessment_id, user_id, answers, total_points, started_at, is_remedial) \
         VALUES ($1, $2, '{{}}'::jsonb, $3, $4, $5) RETURNING {ATTEMPT_COLUMNS}"
    );
    let attempt = sqlx::query_as::<_, Attempt>(&sql)
        .bind(assessment.id)
        .bind(user_id)
        .bind(total_points as i32)
        .bind(now)
        .bind(remedial)
        .fetch_one(&mut *conn)
        .await?;

    tracing::info!(
        "User {} started {}attempt {} on assessment {}",
        user_id,
        if remedial { "remedial " } else { "" },
        attempt.id,
        assessment.id
    );
    Ok(attempt)
}

/// Assessment lookup for learners: unpublished ones do not exist for them.
async fn published_assessment(pool: &PgPool, assessment_id: i64) -> Result<Assessment, AppError> {
    let assessment = fetch_assessment(pool, assessment_id).await?;
    if !assessment.is_published {
        return Err(AppError::NotFound("Assessment not found".to_string()));
    }
    Ok(assessment)
}

/// Starts or resumes a regular attempt. Returns the attempt and whether
/// it was newly created.
pub async fn start_attempt(
    pool: &PgPool,
    actor: &Actor,
    assessment_id: i64,
    now: DateTime<Utc>,
) -> Result<(AttemptView, bool), AppError> {
    let assessment = published_assessment(pool, assessment_id).await?;

    let mut tx = pool.begin().await?;
    // Serializes concurrent starts by the same learner.
    lock_user(&mut tx, actor.user_id).await?;

    let mut attempts = user_attempts(&mut tx, actor.user_id, assessment.id, Some(false)).await?;
    close_expired(&mut tx, &assessment, &mut attempts, now).await?;

    let decision = match lifecycle::check_can_start(&assessment, &attempts, now) {
        Ok(decision) => decision,
        Err(violation) => {
            // Keep any auto-submissions made above.
            tx.commit().await?;
            return Err(violation.into());
        }
    };

    let (attempt, created) = match decision {
        StartDecision::Resume(id) => (lock_attempt(&mut tx, id).await?, false),
        StartDecision::Create => (
            insert_attempt(&mut tx, &assessment, actor.user_id, false, now).await?,
            true,
        ),
    };

    let view = attempt_view(&mut *tx, attempt, assessment.time_limit_minutes).await?;
    tx.commit().await?;
    Ok((view, created))
}

/// Starts or resumes the remedial attempt on a final exam.
pub async fn start_remedial(
    pool: &PgPool,
    actor: &Actor,
    assessment_id: i64,
    now: DateTime<Utc>,
) -> Result<(AttemptView, bool), AppError> {
    let assessment = published_assessment(pool, assessment_id).await?;

    let mut tx = pool.begin().await?;
    lock_user(&mut tx, actor.user_id).await?;

    let mut remedial = user_attempts(&mut tx, actor.user_id, assessment.id, Some(true)).await?;
    close_expired(&mut tx, &assessment, &mut remedial, now).await?;

    if let Some(open) = remedial.iter().find(|a| !a.is_completed()) {
        let open = open.clone();
        let view = attempt_view(&mut *tx, open, assessment.time_limit_minutes).await?;
        tx.commit().await?;
        return Ok((view, false));
    }

    // The regular exam attempt must be closed and graded before the stored
    // final score reflects it.
    let mut regular = user_attempts(&mut tx, actor.user_id, assessment.id, Some(false)).await?;
    close_expired(&mut tx, &assessment, &mut regular, now).await?;

    let final_total = fetch_final_score(&mut *tx, actor.user_id, assessment.course_id)
        .await?
        .map(|f| f.total_score);

    if let Err(violation) = lifecycle::check_remedial_eligibility(
        &assessment,
        &regular,
        final_total,
        !remedial.is_empty(),
    ) {
        tx.commit().await?;
        return Err(violation.into());
    }

    let attempt = insert_attempt(&mut tx, &assessment, actor.user_id, true, now).await?;
    let view = attempt_view(&mut *tx, attempt, assessment.time_limit_minutes).await?;
    tx.commit().await?;
    Ok((view, true))
}

/// Loads an attempt for its owner or course staff. Expired attempts are
/// auto-submitted on read.
pub async fn view_attempt(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: i64,
    now: DateTime<Utc>,
) -> Result<AttemptView, AppError> {
    let mut tx = pool.begin().await?;
    let attempt = lock_attempt(&mut tx, attempt_id).await?;
    let assessment = fetch_assessment(&mut *tx, attempt.assessment_id).await?;
    ensure_attempt_access(pool, actor, &attempt, &assessment).await?;

    let attempt = if lifecycle::is_expired(&attempt, assessment.time_limit_minutes, now) {
        tracing::info!("Attempt {} expired, auto-submitting on read", attempt.id);
        finalize_attempt(&mut tx, &assessment, &attempt, GradingPath::AutoSubmit, now).await?
    } else {
        attempt
    };

    let view = attempt_view(&mut *tx, attempt, assessment.time_limit_minutes).await?;
    tx.commit().await?;
    Ok(view)
}

/// Applies posted answers onto the stored sheet. Keys must be question ids
/// of this assessment; grade keys are reserved for tutors. Essay text is
/// sanitized on the way in.
pub fn merge_answers(
    sheet: &mut AnswerSheet,
    questions: &[Question],
    posted: BTreeMap<String, Value>,
) -> Result<(), AppError> {
    for (key, value) in posted {
        if AnswerSheet::is_grade_key(&key) {
            return Err(field_error(
                "answers",
                "grade_not_allowed",
                format!("'{key}' cannot be set by the learner"),
            ));
        }
        let question = key
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|id| questions.iter().find(|q| q.id == id))
            .ok_or_else(|| {
                field_error(
                    "answers",
                    "unknown_question",
                    format!("'{key}' is not a question of this assessment"),
                )
            })?;

        let value = match (&question.answer_config.0, value) {
            (AnswerConfig::Essay, Value::String(text)) => Value::String(clean_html(&text)),
            (_, other) => other,
        };
        sheet.set_response(question.id, value);
    }
    Ok(())
}

/// Merges answers into an open attempt.
pub async fn save_progress(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: i64,
    posted: BTreeMap<String, Value>,
    now: DateTime<Utc>,
) -> Result<AttemptView, AppError> {
    let mut tx = pool.begin().await?;
    let mut attempt = lock_attempt(&mut tx, attempt_id).await?;
    ensure_owner(actor, &attempt)?;
    let assessment = fetch_assessment(&mut *tx, attempt.assessment_id).await?;

    if let Err(violation) = lifecycle::ensure_open(&attempt, assessment.time_limit_minutes, now) {
        if violation == RuleViolation::AttemptExpired {
            finalize_attempt(&mut tx, &assessment, &attempt, GradingPath::AutoSubmit, now).await?;
            tx.commit().await?;
        }
        return Err(violation.into());
    }

    let questions = fetch_questions(&mut *tx, assessment.id).await?;
    merge_answers(&mut attempt.answers.0, &questions, posted)?;

    let sql = format!(
        "UPDATE assessment_attempts SET answers = $2 WHERE id = $1 RETURNING {ATTEMPT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Attempt>(&sql)
        .bind(attempt.id)
        .bind(Json(&attempt.answers.0))
        .fetch_one(&mut *tx)
        .await?;

    let view = attempt_view(&mut *tx, updated, assessment.time_limit_minutes).await?;
    tx.commit().await?;
    Ok(view)
}

/// Submits an attempt for auto-grading.
pub async fn submit_attempt(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: i64,
    now: DateTime<Utc>,
) -> Result<AttemptView, AppError> {
    let mut tx = pool.begin().await?;
    let attempt = lock_attempt(&mut tx, attempt_id).await?;
    ensure_owner(actor, &attempt)?;
    if attempt.is_completed() {
        return Err(RuleViolation::AttemptCompleted.into());
    }
    let assessment = fetch_assessment(&mut *tx, attempt.assessment_id).await?;

    // Late submissions still go through; lazy expiry would submit the same answers.
    let attempt =
        finalize_attempt(&mut tx, &assessment, &attempt, GradingPath::AutoSubmit, now).await?;

    let view = attempt_view(&mut *tx, attempt, assessment.time_limit_minutes).await?;
    tx.commit().await?;
    Ok(view)
}

/// Records tutor grades on a completed attempt and re-runs the pipeline.
/// Grades overwrite earlier ones, so repeating a call changes nothing.
pub async fn grade_attempt(
    pool: &PgPool,
    attempt_id: i64,
    grades: &HashMap<i64, i32>,
    now: DateTime<Utc>,
) -> Result<AttemptView, AppError> {
    let mut tx = pool.begin().await?;
    let mut attempt = lock_attempt(&mut tx, attempt_id).await?;
    let assessment = fetch_assessment(&mut *tx, attempt.assessment_id).await?;

    if !attempt.is_completed() {
        return Err(RuleViolation::AttemptInProgress.into());
    }

    let questions = fetch_questions(&mut *tx, assessment.id).await?;
    let by_id: HashMap<i64, &Question> = questions.iter().map(|q| (q.id, q)).collect();
    for (question_id, grade) in grades {
        let question = by_id.get(question_id).ok_or_else(|| {
            field_error(
                "grades",
                "unknown_question",
                format!("Question {question_id} is not part of this assessment"),
            )
        })?;
        if *grade < 0 || *grade > question.points {
            return Err(field_error(
                "grades",
                "grade_out_of_range",
                format!(
                    "Grade for question {question_id} must be between 0 and {}",
                    question.points
                ),
            ));
        }
        attempt.answers.0.set_grade(*question_id, *grade);
    }

    let attempt =
        finalize_attempt(&mut tx, &assessment, &attempt, GradingPath::TutorReview, now).await?;
    let view = attempt_view(&mut *tx, attempt, assessment.time_limit_minutes).await?;
    tx.commit().await?;
    Ok(view)
}

/// Course staff of the attempt's assessment, resolved from the database.
pub async fn ensure_attempt_staff(
    pool: &PgPool,
    actor: &Actor,
    attempt_id: i64,
) -> Result<(), AppError> {
    let course_id: i64 = sqlx::query_scalar(
        r#"
        SELECT a.course_id
        FROM assessment_attempts t
        JOIN assessments a ON a.id = t.assessment_id
        WHERE t.id = $1
        "#,
    )
    .bind(attempt_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

    ensure_course_staff(pool, actor, course_id).await?;
    Ok(())
}

fn ensure_owner(actor: &Actor, attempt: &Attempt) -> Result<(), AppError> {
    if attempt.user_id == actor.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not your attempt".to_string()))
    }
}

async fn ensure_attempt_access(
    pool: &PgPool,
    actor: &Actor,
    attempt: &Attempt,
    assessment: &Assessment,
) -> Result<(), AppError> {
    if attempt.user_id == actor.user_id {
        return Ok(());
    }
    ensure_course_staff(pool, actor, assessment.course_id).await?;
    Ok(())
}
