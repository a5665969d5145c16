use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
    http::HeaderValue,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::CorsOrigins;
use crate::detector::detect_events;
use crate::error::{AppError, Result};
use crate::api::models::{DetectRequest, DetectResponse, HealthResponse};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.cors_origins);

    Router::new()
        .route("/detect_date", post(detect_date_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(list) => {
            let origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();

            // Credentials rule out wildcards, so methods and headers are mirrored.
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}

async fn detect_date_handler(
    State(state): State<AppState>,
    Json(req): Json<DetectRequest>,
) -> Result<Json<DetectResponse>> {
    info!("Processing detect_date request ({} chars)", req.text.chars().count());
    let start_time = Instant::now();

    let result = tokio::time::timeout(
        state.config.request_timeout,
        detect_events(
            &req.text,
            &state.finder,
            state.summarizer.as_ref(),
            state.config.context_radius,
        ),
    )
    .await;

    let elapsed = start_time.elapsed();
    match result {
        Ok(response) => {
            info!("Request processing took {:?}, {} event(s)", elapsed, response.event_count());
            Ok(Json(response))
        }
        Err(_) => {
            warn!("Request timed out after {:?}", elapsed);
            Err(AppError::Timeout)
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        summarizer: state.summarizer.backend().to_string(),
        model: state.summarizer.model().to_string(),
    })
}
