// tests/rewards_tests.rs

mod common;

use common::{multiple_choice, spawn_app};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn profile_tracks_points_and_achievements() {
    let Some(app) = spawn_app().await else { return };
    let (_, tutor) = app.user("tutor", "tutor").await;
    let (_, student) = app.user("student", "student").await;
    let course_id = app.course_with_student(&tutor, &student).await;

    let (status, me) = app.get(&student, "/profile/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["level"], 1);
    assert_eq!(me["points_balance"], 0);
    assert!(me.get("password").is_none());

    let (quiz_id, q) = app
        .published_assessment(
            &tutor,
            course_id,
            json!({ "title": "Quiz", "type": "quiz", "max_score": 10 }),
            vec![multiple_choice(10, 2)],
        )
        .await;
    let (_, attempt) = app
        .post(&student, &format!("/assessments/{}/attempts", quiz_id), json!({}))
        .await;
    let attempt_id = attempt["id"].as_i64().unwrap();
    app.put(
        &student,
        &format!("/attempts/{}/progress", attempt_id),
        json!({ "answers": { q[0].to_string(): 2 } }),
    )
    .await;
    app.post(&student, &format!("/attempts/{}/submit", attempt_id), json!({}))
        .await;

    let (_, me) = app.get(&student, "/profile/me").await;
    assert_eq!(me["xp"], 10);
    assert_eq!(me["points_balance"], 10);
    assert_eq!(me["current_streak"], 1);

    let unlocked: Vec<&str> = me["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| !a["unlocked_at"].is_null())
        .map(|a| a["slug"].as_str().unwrap())
        .collect();
    assert!(unlocked.contains(&"first-steps"));
    assert!(unlocked.contains(&"flawless"));
    assert!(!unlocked.contains(&"dedicated-learner"));

    let (status, ledger) = app.get(&student, "/profile/me/points").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ledger[0]["amount"], 10);
    assert_eq!(ledger[0]["reason"], "assessment_completed");
}

#[tokio::test]
async fn failed_redemption_changes_nothing() {
    let Some(app) = spawn_app().await else { return };
    let (_, admin) = app.user("admin", "admin").await;
    let (student_id, student) = app.user("student", "student").await;

    let (status, expensive) = app
        .post(
            &admin,
            "/admin/rewards",
            json!({ "name": "Hoodie", "cost": 1000, "stock": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let expensive_id = expensive["id"].as_i64().unwrap();

    let (status, body) = app
        .post(&student, &format!("/rewards/{}/redeem", expensive_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "insufficient_points");

    let stock: i32 = sqlx::query_scalar("SELECT stock FROM rewards WHERE id = $1")
        .bind(expensive_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stock, 3);
    let redemptions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reward_redemptions WHERE user_id = $1")
            .bind(student_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(redemptions, 0);
}

#[tokio::test]
async fn redemption_debits_points_and_stock() {
    let Some(app) = spawn_app().await else { return };
    let (_, admin) = app.user("admin", "admin").await;
    let (student_id, student) = app.user("student", "student").await;

    let (_, sticker) = app
        .post(
            &admin,
            "/admin/rewards",
            json!({ "name": "Sticker", "description": "Laptop sticker", "cost": 5, "stock": 1 }),
        )
        .await;
    let sticker_id = sticker["id"].as_i64().unwrap();

    sqlx::query("UPDATE users SET points_balance = 8 WHERE id = $1")
        .bind(student_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, redemption) = app
        .post(&student, &format!("/rewards/{}/redeem", sticker_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(redemption["cost"], 5);

    let (_, me) = app.get(&student, "/profile/me").await;
    assert_eq!(me["points_balance"], 3);

    let (status, body) = app
        .post(&student, &format!("/rewards/{}/redeem", sticker_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "out_of_stock");

    let (_, ledger) = app.get(&student, "/profile/me/points").await;
    assert_eq!(ledger[0]["amount"], -5);
    assert_eq!(ledger[0]["reason"], "reward_redeemed");
}
