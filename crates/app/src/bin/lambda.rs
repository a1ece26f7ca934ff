//! Tutor chat API - AWS Lambda Runtime

use lambda_http::{run, Error};
use tower_http::trace::TraceLayer;
use tracing::info;

use tutor_app::create_app;
use tutor_common::config::Config;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config =
        Config::from_env().map_err(|e| Error::from(format!("Configuration error: {}", e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .json()
        .without_time()
        .init();

    info!("Initializing tutor chat API Lambda");

    let app = create_app(&config)
        .await
        .map_err(|e| Error::from(format!("App initialization error: {}", e)))?;

    let router = app.router.layer(TraceLayer::new_for_http());

    info!("Tutor chat API Lambda ready to serve requests");

    run(router).await
}
