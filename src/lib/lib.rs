//! A small todo-list HTTP service: five JSON routes over one SQLite table.
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_service::adapters::{HttpServer, ServerConfig};
//! use todo_service::storage::sqlite::SQLiteStorage;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let storage = Arc::new(SQLiteStorage::new(&config.database_path).await?);
//! HttpServer::new(storage).serve(&config.addr).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod core;
pub mod storage;
