mod config;
mod error;
mod handlers;
mod providers;
mod routes;
mod scheduling;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, CalendarBackend};
use crate::providers::{
    CalComCalendar, CalendarProvider, InMemoryPreferences, PreferencesStore, StaticCalendar,
};
use crate::routes::api_routes;
use crate::services::AvailabilityService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rendezvous_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    tracing::info!("Starting Rendezvous scheduling server");

    let (calendar, preferences) = build_providers(&config)?;
    let availability =
        AvailabilityService::new(calendar, preferences, config.search_horizon_days);
    tracing::info!(
        provider = ?config.calendar_provider,
        horizon_days = config.search_horizon_days,
        timezone = %config.default_timezone,
        "Availability service initialized"
    );

    // Build application
    let app = create_app(AppState::new(availability), &config);

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Calendar and preferences sources for the configured backend.
fn build_providers(
    config: &AppConfig,
) -> Result<(Arc<dyn CalendarProvider>, Arc<dyn PreferencesStore>)> {
    match config.calendar_provider {
        CalendarBackend::Calcom => {
            let api_key = config
                .calcom_api_key
                .clone()
                .context("RENDEZVOUS_CALCOM_API_KEY must be set")?;
            let client = CalComCalendar::new(
                config.calcom_api_url.clone(),
                api_key,
                Duration::from_secs(config.request_timeout_secs),
            )
            .context("Failed to build Cal.com client")?
            .with_default_timezone(config.default_timezone);
            tracing::info!("Using Cal.com calendars at {}", config.calcom_api_url);
            let client = Arc::new(client);
            let calendar: Arc<dyn CalendarProvider> = client.clone();
            let preferences: Arc<dyn PreferencesStore> = client;
            Ok((calendar, preferences))
        }
        CalendarBackend::Static => {
            tracing::warn!("Using static in-memory calendars; every user is free");
            let calendar: Arc<dyn CalendarProvider> = Arc::new(StaticCalendar::new());
            let preferences: Arc<dyn PreferencesStore> =
                Arc::new(InMemoryPreferences::new(config.default_timezone));
            Ok((calendar, preferences))
        }
    }
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Build CORS layer from configuration.
///
/// With no configured origins the layer is permissive (development only).
fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "RENDEZVOUS_CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
