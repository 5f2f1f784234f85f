//! # SIAGA API
//!
//! The API crate provides the web server implementation for the SIAGA
//! emergency-response coordination service. It defines RESTful endpoints for
//! panic alerts, duty patterns, shifts and roster automation.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like identity and error handling
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.
//! Alert delivery goes through the `siaga-notify` router, so a broken channel
//! never takes the HTTP boundary down with it.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for identity, logging, and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::Router;
use chrono_tz::Tz;
use eyre::Result;
use siaga_core::alerts::DuplicatePolicy;
use siaga_notify::config::NotifyConfig;
use siaga_notify::AlertRouter;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// This struct encapsulates dependencies that are shared across the
/// application: the database pool, the alert delivery router and the roster
/// policy knobs resolved at startup.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Fan-out router over the configured notification channels
    pub alert_router: AlertRouter,
    /// Timezone for "today" and calendar-day computations
    pub timezone: Tz,
    /// Same-day duplicate alert policy
    pub duplicate_policy: DuplicatePolicy,
    /// Dashboard link embedded in alert notifications
    pub dashboard_url: String,
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, builds the notification router from the
/// notify configuration, configures routes, and starts the HTTP server.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let notify = NotifyConfig::from_env()?;
/// let db_pool = siaga_db::create_pool(&config.database_url).await?;
/// start_server(config, notify, db_pool).await?;
/// ```
pub async fn start_server(
    config: config::ApiConfig,
    notify: NotifyConfig,
    db_pool: PgPool,
) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let alert_router = AlertRouter::from_config(&notify);
    info!(
        "Alert delivery channels: {:?}",
        alert_router.active_channels()
    );

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        alert_router,
        timezone: config.roster_timezone,
        duplicate_policy: config.duplicate_policy,
        dashboard_url: notify.dashboard_url.clone(),
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Panic alert endpoints
        .merge(routes::alerts::routes())
        // Weekly pattern management endpoints
        .merge(routes::patterns::routes())
        // Shift and roster endpoints
        .merge(routes::shifts::routes())
        // Generation automation endpoints
        .merge(routes::automation::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(std::time::Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
