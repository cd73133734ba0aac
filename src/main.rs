//! Portfolio site backend-for-frontend.
//!
//! Serves view-ready JSON for the gallery, travel highlights, projects and
//! contact pages, reading the content API through a keyed query cache.

mod api;
mod auth;
mod client;
mod config;
mod consent;
mod errors;
mod models;
mod query;
mod services;
mod view;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use client::ApiClient;
use config::Config;
use consent::{ConsentState, ConsentStore};
use query::PortfolioQueries;
use services::Services;

/// Entries unread for this long are evicted from the query cache.
const CACHE_GC_WINDOW: Duration = Duration::from_secs(10 * 60);
const CACHE_GC_INTERVAL: Duration = Duration::from_secs(60);

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<PortfolioQueries>,
    pub consent: Arc<ConsentState>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the client, services, cache and consent storage for `config`.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let client = ApiClient::new(&config)?;
        let queries = PortfolioQueries::new(Services::new(client));
        let consent = ConsentState::load(ConsentStore::new(config.consent_path.clone()));

        Ok(Self {
            queries: Arc::new(queries),
            consent: Arc::new(consent),
            config: Arc::new(config),
        })
    }
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; a missing API URL is fatal
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    init_logging(&config.log_level);

    tracing::info!("Starting portfolio site");
    tracing::info!("Content API: {}", config.api_url);
    tracing::info!("Media base: {}", config.media_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (PORTFOLIO_ADMIN_PSK). Admin endpoints are open!");
    }
    if config.analytics.enabled && config.analytics.tracking_id.is_none() {
        tracing::warn!("Analytics enabled without PORTFOLIO_ANALYTICS_ID; analytics stays off");
    }

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config)?;

    // Periodic eviction of idle cache entries
    let queries = state.queries.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_GC_INTERVAL);
        loop {
            ticker.tick().await;
            queries.collect_garbage(CACHE_GC_WINDOW);
        }
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Page scripts may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.admin_psk.clone();

    let admin_routes = Router::new()
        .route("/cache/invalidate", post(api::invalidate_cache))
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(psk.clone(), req, next)
        }));

    let api_routes = Router::new()
        // Site chrome
        .route("/site", get(api::get_site))
        // Gallery
        .route("/gallery", get(api::get_gallery))
        .route("/gallery/{slug}", get(api::get_gallery_image))
        .route("/categories", get(api::list_categories))
        // Projects
        .route("/projects", get(api::list_projects))
        // Travel highlights
        .route("/travel-highlights", get(api::list_travel_highlights))
        .route("/travel-highlights/{country}", get(api::get_country_highlight))
        .route(
            "/travel-highlights/{country}/{place}",
            get(api::get_place_highlight),
        )
        // Contact
        .route("/contact", post(api::submit_contact))
        // Consent
        .route("/consent", get(api::get_consent).put(api::put_consent))
        .nest("/admin", admin_routes);

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
