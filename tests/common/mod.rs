// tests/common/mod.rs

#![allow(dead_code)]

use gradebook::{config::Config, routes, state::AppState};
use reqwest::StatusCode;
use serde_json::{Value, json};
use sqlx::{PgPool, postgres::PgPoolOptions};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        server_port: 0,
        admin_username: None,
        admin_password: None,
    }
}

pub struct TestApp {
    pub address: String,
    pub pool: PgPool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port against the database in DATABASE_URL.
/// Returns `None` when no database is configured, so callers can skip.
pub async fn spawn_app() -> Option<TestApp> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let state = AppState {
        pool: pool.clone(),
        config: test_config(&database_url),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some(TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    })
}

/// Username unique across test runs.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    /// Registers an account, optionally promotes it, and logs in.
    /// Returns `(user_id, token)`.
    pub async fn user(&self, prefix: &str, role: &str) -> (i64, String) {
        let username = unique_name(prefix);
        let password = "password123";

        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let user: Value = res.json().await.unwrap();
        let id = user["id"].as_i64().unwrap();

        if role != "student" {
            sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
                .bind(role)
                .bind(id)
                .execute(&self.pool)
                .await
                .unwrap();
        }

        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        (id, body["token"].as_str().unwrap().to_string())
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    pub async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    /// Moves an attempt's start time into the past.
    pub async fn backdate(&self, attempt_id: i64, minutes: i64) {
        sqlx::query(
            "UPDATE assessment_attempts SET started_at = started_at - make_interval(mins => $2::INT) WHERE id = $1",
        )
        .bind(attempt_id)
        .bind(minutes as i32)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    /// Creates a published course owned by `tutor`, with `student` enrolled.
    pub async fn course_with_student(&self, tutor: &str, student: &str) -> i64 {
        let (status, course) = self
            .post(
                tutor,
                "/courses",
                json!({ "title": "Cell Biology", "is_published": true }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let course_id = course["id"].as_i64().unwrap();

        let (status, _) = self
            .post(student, &format!("/courses/{}/enroll", course_id), json!({}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        course_id
    }

    /// Creates an assessment with the given questions and publishes it.
    /// Returns the assessment id and the question ids in order.
    pub async fn published_assessment(
        &self,
        tutor: &str,
        course_id: i64,
        spec: Value,
        questions: Vec<Value>,
    ) -> (i64, Vec<i64>) {
        let (status, assessment) = self
            .post(tutor, &format!("/courses/{}/assessments", course_id), spec)
            .await;
        assert_eq!(status, StatusCode::CREATED, "{assessment}");
        let id = assessment["id"].as_i64().unwrap();

        let mut question_ids = Vec::new();
        for q in questions {
            let (status, question) = self
                .post(tutor, &format!("/assessments/{}/questions", id), q)
                .await;
            assert_eq!(status, StatusCode::CREATED, "{question}");
            question_ids.push(question["id"].as_i64().unwrap());
        }

        let (status, _) = self
            .put(
                tutor,
                &format!("/assessments/{}/publish", id),
                json!({ "is_published": true }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        (id, question_ids)
    }
}

pub fn multiple_choice(points: i32, correct_index: usize) -> Value {
    json!({
        "content": "Which organelle produces ATP?",
        "points": points,
        "answer_config": {
            "kind": "multiple_choice",
            "options": ["Nucleus", "Mitochondrion", "Ribosome", "Golgi body"],
            "correct_index": correct_index
        }
    })
}

pub fn fill_blank(points: i32, answer: &str) -> Value {
    json!({
        "content": "Water moves across membranes by ____.",
        "points": points,
        "answer_config": { "kind": "fill_blank", "accepted_answers": [answer] }
    })
}

pub fn essay(points: i32) -> Value {
    json!({
        "content": "Explain diffusion.",
        "points": points,
        "answer_config": { "kind": "essay" }
    })
}
