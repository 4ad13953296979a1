use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::require_auth;
use crate::handlers::{self, activity_handlers, auth_handlers, record_handlers};
use crate::middleware::add_security_headers;
use crate::AppState;

/// The full HTTP surface.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/signup", post(auth_handlers::sign_up))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/email/send", post(auth_handlers::send_code))
        .route("/auth/email/verify", post(auth_handlers::verify_code))
        .route("/activities", get(activity_handlers::list))
        .route("/activities/search", get(activity_handlers::search))
        .route("/activities/best", get(activity_handlers::best))
        .route("/activities/{id}", get(activity_handlers::detail));

    let protected_routes = Router::new()
        .route("/users/me", get(auth_handlers::me))
        .route(
            "/activities/recommendations",
            get(activity_handlers::recommendations),
        )
        .route(
            "/activities/recommendations/refresh",
            post(activity_handlers::refresh_recommendations),
        )
        .route(
            "/activities/best/refresh",
            post(activity_handlers::refresh_best),
        )
        .route("/activities/ingest", post(activity_handlers::ingest))
        .route(
            "/activities/{id}/reviews/refresh",
            post(activity_handlers::refresh_review),
        )
        .route(
            "/records",
            get(record_handlers::list_records).post(record_handlers::create_record),
        )
        .route(
            "/records/{id}",
            get(record_handlers::get_record)
                .patch(record_handlers::update_record)
                .delete(record_handlers::delete_record),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            add_security_headers,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(state)
}
