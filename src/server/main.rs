use todo_service::adapters::{HttpServer, ServerConfig};
use todo_service::storage::sqlite::SQLiteStorage;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "tracing")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
            .init();
    }
    let config = ServerConfig::default();
    let storage = Arc::new(SQLiteStorage::new(&config.database_path).await?);
    let server = HttpServer::new(storage);
    server.serve(&config.addr).await?;
    Ok(())
}
