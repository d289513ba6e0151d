use axum::{
    routing::{get, post},
    Router,
};
use handler::AppState;
use matrix_steps::{JsonFileHistory, JsonFilePreferences, OperationEngine};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod handler;
mod model;
mod openapi;

use crate::config::ServiceConfig;
use crate::openapi::ApiDoc;

#[tokio::main]
async fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
    }
    tracing::info!("Tracing initialized. Starting matrix webservice...");

    let config = ServiceConfig::from_env();
    let engine = build_engine(&config);
    let app = app(AppState::new(engine));

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", config.bind_addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

/// Installs the global subscriber. Initializing it also installs the
/// `tracing-log` bridge, so records from the engine crates' `log` calls
/// reach the same output.
fn init_tracing() -> Result<(), TryInitError> {
    // Fallback to debug output for our own crates if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,matrix_webservice=debug,matrix_steps=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .try_init()
}

fn build_engine(config: &ServiceConfig) -> OperationEngine {
    if config.in_memory {
        tracing::info!("Keeping history and settings in memory");
        OperationEngine::in_memory()
    } else {
        let history = JsonFileHistory::new(&config.history_file);
        let preferences = JsonFilePreferences::open(&config.settings_file);
        tracing::info!(
            "History file: {}, settings file: {}",
            history.path().display(),
            preferences.path().display()
        );
        OperationEngine::new(history, preferences)
    }
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(health_check))
        .route("/api/add", post(handler::add_handler))
        .route("/api/subtract", post(handler::subtract_handler))
        .route("/api/multiply", post(handler::multiply_handler))
        .route("/api/determinant", post(handler::determinant_handler))
        .route("/api/transpose", post(handler::transpose_handler))
        .route("/api/inverse", post(handler::inverse_handler))
        .route("/api/history", get(handler::history_handler))
        .route("/api/history/clear", post(handler::clear_history_handler))
        .route(
            "/api/settings",
            get(handler::get_settings_handler).post(handler::update_settings_handler),
        )
        // Spanish aliases for existing web clients
        .route("/api/suma", post(handler::add_handler))
        .route("/api/resta", post(handler::subtract_handler))
        .route("/api/multiplicacion", post(handler::multiply_handler))
        .route("/api/determinante", post(handler::determinant_handler))
        .route("/api/transpuesta", post(handler::transpose_handler))
        .route("/api/inversa", post(handler::inverse_handler))
        .route("/api/historial", get(handler::history_handler))
        .route("/api/limpiar-historial", post(handler::clear_history_handler))
        .route(
            "/api/configuracion",
            get(handler::get_settings_handler).post(handler::update_settings_handler),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
pub async fn health_check() -> &'static str {
    tracing::info!("Health check endpoint hit");
    "Matrix webservice is running!"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_init_installs_log_bridge() {
        init_tracing().unwrap();
        // The bridge is already the global `log` logger.
        assert!(tracing_log::LogTracer::init().is_err());
        log::info!("forwarded through tracing");
    }
}
