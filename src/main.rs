use tokio::net::TcpListener;
use tracing::info;
use calendar_event_extractor::{
    config::Config,
    api::routes::create_router,
    logging::init_logger,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;
    init_logger(config.log_format);

    let server_addr = config.server_addr;
    info!(
        "Starting calendar-event-extractor v{} on {}",
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    // The summarizer is built once and shared read-only by every request
    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
