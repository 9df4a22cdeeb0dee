use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_system::{
    config::Config, controllers, database::Database, services::overdue::OverdueService, AppState,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Library Seats API");

    // Connect to the database
    let db = Database::new(&config.database.url, config.database.pool_size)
        .await
        .expect("Failed to connect to database");
    info!("Database connected");

    // Run migrations
    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    // Create the shared application state
    let app_state = Arc::new(AppState {
        db: db.clone(),
        config: config.clone(),
    });

    // --- Start background tasks ---

    // Задача помечает просроченные платежи
    let sweep_interval = Duration::from_secs(config.fees.overdue_sweep_seconds);
    let overdue = OverdueService::new(app_state.clone());
    task::spawn(async move {
        loop {
            overdue.mark_overdue_fees().await;
            tokio::time::sleep(sweep_interval).await;
        }
    });

    // --- Start the web server ---

    // Панель администратора живет на другом origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create the main router
    let app = Router::new()
        .route("/", get(|| async { "Library Seats API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        // Pass the application state to the router
        .with_state(app_state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
