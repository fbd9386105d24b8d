// src/handlers/assessments.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::{AppError, field_error},
    models::{
        assessment::{Assessment, AssessmentDetail, PublishRequest},
        powerup::ConfigurePowerupsRequest,
        question::{CreateQuestionRequest, PublicQuestion, Question},
    },
    services::{
        grading::{ASSESSMENT_COLUMNS, fetch_assessment, fetch_questions},
        powerups::allowed_powerups,
    },
    utils::{
        jwt::Claims,
        permissions::{Actor, ensure_course_access, ensure_course_staff},
    },
};

/// Loads an assessment the actor may manage.
async fn staff_assessment(
    pool: &PgPool,
    actor: &Actor,
    assessment_id: i64,
) -> Result<Assessment, AppError> {
    let assessment = fetch_assessment(pool, assessment_id).await?;
    ensure_course_staff(pool, actor, assessment.course_id).await?;
    Ok(assessment)
}

/// Retrieves an assessment with its questions and allowed powerups.
///
/// Questions never carry the answer key. Learners get 404 for unpublished
/// assessments.
pub async fn get_assessment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let assessment = fetch_assessment(&pool, id).await?;
    let is_staff = ensure_course_access(&pool, &actor, assessment.course_id).await?;
    if !assessment.is_published && !is_staff {
        return Err(AppError::NotFound("Assessment not found".to_string()));
    }

    let questions = fetch_questions(&pool, id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();
    let powerups: Vec<_> = allowed_powerups(&pool, id)
        .await?
        .into_iter()
        .map(|p| json!({ "slug": p.slug, "name": p.name, "usage_limit": p.usage_limit }))
        .collect();

    let detail = AssessmentDetail {
        assessment,
        questions,
    };
    let mut body = serde_json::to_value(detail)?;
    body["powerups"] = json!(powerups);
    Ok(Json(body))
}

/// Adds a question. Position defaults to the end of the list.
pub async fn add_question(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let assessment = staff_assessment(&pool, &actor, id).await?;
    payload.validate()?;

    let position = match payload.position {
        Some(p) => p,
        None => {
            let last: Option<i32> = sqlx::query_scalar(
                "SELECT MAX(position) FROM assessment_questions WHERE assessment_id = $1",
            )
            .bind(assessment.id)
            .fetch_one(&pool)
            .await?;
            last.map_or(1, |p| p + 1)
        }
    };

    let question = sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO assessment_questions (assessment_id, type, content, answer_config, points, position)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, assessment_id, content, answer_config, points, position
        "#,
    )
    .bind(assessment.id)
    .bind(payload.answer_config.kind())
    .bind(&payload.content)
    .bind(SqlJson(&payload.answer_config))
    .bind(payload.points)
    .bind(position)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Added {} question {} to assessment {}",
        payload.answer_config.kind(),
        question.id,
        assessment.id
    );
    Ok((StatusCode::CREATED, Json(question)))
}

/// Publishes or unpublishes an assessment.
pub async fn publish(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<PublishRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    staff_assessment(&pool, &actor, id).await?;

    let sql = format!(
        "UPDATE assessments SET is_published = $2 WHERE id = $1 RETURNING {ASSESSMENT_COLUMNS}"
    );
    let assessment = sqlx::query_as::<_, Assessment>(&sql)
        .bind(id)
        .bind(payload.is_published)
        .fetch_one(&pool)
        .await?;

    tracing::info!(
        "Assessment {} is_published = {}",
        assessment.id,
        assessment.is_published
    );
    Ok(Json(assessment))
}

/// Replaces the set of powerups allowed on an assessment.
pub async fn configure_powerups(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<ConfigurePowerupsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_claims(&claims)?;
    let assessment = staff_assessment(&pool, &actor, id).await?;
    payload.validate()?;

    let catalog: HashMap<String, i64> =
        sqlx::query_as::<_, (String, i64)>("SELECT slug, id FROM powerups")
            .fetch_all(&pool)
            .await?
            .into_iter()
            .collect();

    let mut rows = Vec::with_capacity(payload.powerups.len());
    for entry in &payload.powerups {
        let powerup_id = catalog.get(&entry.slug).ok_or_else(|| {
            field_error(
                "powerups",
                "unknown_powerup",
                format!("Unknown powerup '{}'", entry.slug),
            )
        })?;
        if rows.iter().any(|(pid, _)| pid == powerup_id) {
            return Err(field_error(
                "powerups",
                "duplicate_powerup",
                format!("Powerup '{}' listed twice", entry.slug),
            ));
        }
        rows.push((*powerup_id, entry.usage_limit));
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM assessment_powerups WHERE assessment_id = $1")
        .bind(assessment.id)
        .execute(&mut *tx)
        .await?;

    if !rows.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO assessment_powerups (assessment_id, powerup_id, usage_limit) ",
        );
        builder.push_values(&rows, |mut b, (powerup_id, usage_limit)| {
            b.push_bind(assessment.id)
                .push_bind(*powerup_id)
                .push_bind(*usage_limit);
        });
        builder.build().execute(&mut *tx).await?;
    }
    tx.commit().await?;

    let allowed = allowed_powerups(&pool, assessment.id).await?;
    tracing::info!(
        "Assessment {} now allows {} powerup(s)",
        assessment.id,
        allowed.len()
    );
    Ok(Json(allowed))
}
