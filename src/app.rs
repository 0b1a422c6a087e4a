use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, AppConfig, SecurityConfig};
use crate::handlers;
use crate::middleware::token_auth_middleware;
use crate::state::AppState;

/// Router built from the global configuration
pub fn app(state: AppState) -> Router {
    app_with_config(state, config::config())
}

pub fn app_with_config(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = match cors_layer(&config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/db_check", get(handlers::db_check))
        .route("/ingest_issue", post(handlers::ingest_issue))
        .route("/get_nof_issues", get(handlers::get_nof_issues))
        .route("/get_all_issues", get(handlers::get_all_issues))
        .route_layer(middleware::from_fn_with_state(state, token_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}
