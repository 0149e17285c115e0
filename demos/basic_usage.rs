//! Walks a keygroup through its lifecycle on a local FReD node
//!
//! Run with: cargo run --example basic_usage

use fred_client::Client;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let client = Client::new("localhost", 9001)?;
    info!("Talking to {}", client.base_url());

    let body = client.create_keygroup("kg").await?;
    info!("create_keygroup: {}", String::from_utf8_lossy(&body));

    let body = client.put("kg", "1", "hi!").await?;
    info!("put: {}", String::from_utf8_lossy(&body));

    let body = client.read("kg", "1").await?;
    info!("read: {}", String::from_utf8_lossy(&body));

    let body = client.delete("kg", "1").await?;
    info!("delete: {}", String::from_utf8_lossy(&body));

    let body = client.delete_keygroup("kg").await?;
    info!("delete_keygroup: {}", String::from_utf8_lossy(&body));

    Ok(())
}
