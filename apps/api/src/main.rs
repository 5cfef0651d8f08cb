use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use outbox_cell::{HttpEventSink, OutboxPublisher};
use shared_config::AppConfig;
use shared_identity::HttpIdentityVerifier;
use shared_store::MemoryStore;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hospital scheduling API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Shared collaborators
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(HttpIdentityVerifier::new(&config));

    // Background event publisher tails the outbox log
    let sink = Arc::new(HttpEventSink::new(&config));
    let publisher = Arc::new(OutboxPublisher::new(store.clone(), sink, &config));
    let publisher_handle = publisher.clone();
    tokio::spawn(async move { publisher_handle.run().await });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(store, identity, &config)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("server error");
}
