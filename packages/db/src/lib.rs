//! SurrealDB integration for the job lifecycle service.
//!
//! This crate provides database connectivity and the job repository
//! backing the lifecycle engine.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod schema;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, connect};
pub use repositories::JobRepository;
pub use schema::init_schema;

/// Connect, apply the schema and hand back a ready repository.
///
/// This should be called once at application startup.
pub async fn init(config: DbConfig) -> Result<JobRepository, DbError> {
    let db = connect(&config).await?;
    init_schema(&db).await?;
    Ok(JobRepository::new(db))
}
