// src/config.rs

use std::env;

use dotenvy::dotenv;

/// Total score below which a learner may sit a remedial final exam,
/// and the cap applied once a remedial attempt is completed.
pub const REMEDIAL_THRESHOLD: i32 = 65;

/// Final exam share of the course score when the exam sets no weight.
pub const DEFAULT_FINAL_EXAM_WEIGHT: i32 = 50;

/// Incorrect options removed by a 50-50 powerup unless configured otherwise.
pub const DEFAULT_FIFTY_FIFTY_REMOVALS: usize = 2;

/// Seconds granted by an extra-time powerup unless configured otherwise.
pub const DEFAULT_EXTRA_TIME_SECONDS: i32 = 300;

pub const XP_PER_LEVEL: i64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub server_port: u16,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            server_port,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }
}
