//! HabitQuest Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habitquest_domain::catalog;
use habitquest_engine::app::App;
use habitquest_engine::infrastructure::{
    clock::SystemClock,
    ports::{ClockPort, PaymentGatewayPort},
    sqlite,
    stripe::{DisabledGateway, StripeGateway},
};
use habitquest_engine::api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from the repo root if a .env file is present.
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitquest_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HabitQuest Engine");

    // Load configuration
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "habitquest.db".into());
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);

    // Connect to SQLite and ensure the schema
    tracing::info!(database = %database_url, "Opening database");
    let pool = sqlite::connect(&database_url).await?;
    sqlite::ensure_schema(&pool).await?;

    let repositories = sqlite::repositories(pool);

    // Seed the authoritative catalogs (no-ops when already present)
    repositories
        .achievement
        .seed_catalog(&catalog::default_achievements())
        .await?;
    repositories
        .skill
        .seed_catalog(&catalog::default_skills())
        .await?;

    // Payment gateway: presence of the secret key toggles the feature
    let gateway: Arc<dyn PaymentGatewayPort> = match StripeGateway::from_env() {
        Some(gateway) => {
            tracing::info!("Payment gateway configured");
            Arc::new(gateway)
        }
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set; payment endpoints disabled");
            Arc::new(DisabledGateway)
        }
    };

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    // Create application
    let app = Arc::new(App::new(repositories, gateway, clock));

    // Build the router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = api::routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app);

    let addr: SocketAddr = format!("{}:{}", server_host, server_port).parse()?;
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
