use my_library_api::{config::Config, create_router, db::Stores, demo, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("My Library API - Starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connecting to store...");
    let stores = match Stores::connect(&config).await {
        Ok(stores) => stores,
        Err(e) => {
            tracing::error!("Failed to connect to store: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(&config, stores);

    if config.seed_demo_account {
        if let Err(e) =
            demo::seed_demo_account(&state.auth_service, &state.library_service).await
        {
            tracing::error!("Failed to seed demo account: {}", e);
        }
    }

    let app = create_router(state, config.request_timeout);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("My Library API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
