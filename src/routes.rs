// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, assessments, attempts, auth, courses, profile, rewards},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: registration and login.
/// * Everything else requires a bearer token; authoring and grading routes
///   additionally require a tutor or admin role, `/admin` requires admin.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);
    let staff = middleware::from_fn(staff_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let course_routes = Router::new()
        .route("/", get(courses::list_courses))
        .route("/", post(courses::create_course).route_layer(staff.clone()))
        .route("/{id}/enroll", post(courses::enroll))
        .route("/{id}/assessments", get(courses::list_assessments))
        .route(
            "/{id}/assessments",
            post(courses::create_assessment).route_layer(staff.clone()),
        )
        .route("/{id}/final-score", get(courses::get_final_score))
        .route(
            "/{id}/gradebook",
            get(courses::gradebook).route_layer(staff.clone()),
        );

    let assessment_routes = Router::new()
        .route("/{id}", get(assessments::get_assessment))
        .route("/{id}/attempts", post(attempts::start))
        .route("/{id}/remedial", post(attempts::start_remedial))
        // Authoring
        .route(
            "/{id}/questions",
            post(assessments::add_question).route_layer(staff.clone()),
        )
        .route(
            "/{id}/publish",
            put(assessments::publish).route_layer(staff.clone()),
        )
        .route(
            "/{id}/powerups",
            put(assessments::configure_powerups).route_layer(staff.clone()),
        );

    let attempt_routes = Router::new()
        .route("/{id}", get(attempts::get_attempt))
        .route("/{id}/progress", put(attempts::save_progress))
        .route("/{id}/submit", post(attempts::submit))
        .route("/{id}/powerups/{slug}", post(attempts::use_powerup))
        .route("/{id}/grades", put(attempts::grade).route_layer(staff));

    let reward_routes = Router::new()
        .route("/", get(rewards::list_rewards))
        .route("/{id}/redeem", post(rewards::redeem));

    let profile_routes = Router::new()
        .route("/me", get(profile::get_me))
        .route("/me/points", get(profile::list_my_points));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/rewards", post(rewards::create_reward))
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware));

    let protected = Router::new()
        .nest("/courses", course_routes)
        .nest("/assessments", assessment_routes)
        .nest("/attempts", attempt_routes)
        .nest("/rewards", reward_routes)
        .nest("/profile", profile_routes)
        .nest("/admin", admin_routes)
        .route_layer(auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
