use std::sync::{Arc, Mutex};

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use metrohyve::config::AppConfig;
use metrohyve::db;
use metrohyve::handlers;
use metrohyve::services::auth::DbTokenVerifier;
use metrohyve::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let state = Arc::new(AppState {
        db: Arc::clone(&db),
        config: config.clone(),
        tokens: Box::new(DbTokenVerifier::new(db)),
    });

    let app = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health))
        .route(
            "/api/v1/listing",
            post(handlers::listing::create_listing).get(handlers::listing::all_listings),
        )
        .route("/api/v1/listing/:listing_id", get(handlers::listing::get_listing))
        .route("/api/v1/user/listing", get(handlers::listing::user_listings))
        .route("/api/v1/location", get(handlers::listing::search))
        .route("/api/v1/booking", post(handlers::booking::create_booking))
        .route("/api/v1/user/booking", get(handlers::booking::user_bookings))
        .route(
            "/api/v1/booking/:listing_id",
            get(handlers::booking::pending_for_listing),
        )
        .route(
            "/api/v1/confirmed/:listing_id",
            get(handlers::booking::confirmed_for_listing),
        )
        .route(
            "/api/v1/declined/:listing_id",
            get(handlers::booking::declined_for_listing),
        )
        .route("/api/v1/date/:listing_id", get(handlers::booking::booked_dates))
        .route(
            "/api/v1/confirm/:booking_id",
            put(handlers::booking::confirm_booking),
        )
        .route(
            "/api/v1/decline/:booking_id",
            put(handlers::booking::decline_booking),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
