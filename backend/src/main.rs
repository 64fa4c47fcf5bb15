use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};

use equb_backend::storage::CsvConnection;
use equb_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up storage");
    let connection = Arc::new(CsvConnection::new_default()?);
    info!("Data directory: {}", connection.base_directory().display());

    let state = AppState::new(connection);
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
