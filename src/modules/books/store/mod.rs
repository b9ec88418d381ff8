//! Storage capabilities for the two independent book datasets.
//!
//! The document and relational copies share a field layout and nothing else:
//! no operation touches both stores.

pub mod mongo;
pub mod mysql;

use async_trait::async_trait;
use thiserror::Error;

use super::models::{BookDocument, BookInput, BookRow, DocumentBook};

pub use mongo::MongoBookStore;
pub use mysql::MySqlBookStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the write; the request itself is at fault.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Sql(#[from] sqlx::Error),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Schema-less book collection: list and insert only.
#[async_trait]
pub trait DocumentBookStore: Send + Sync {
    /// All documents in natural storage order.
    async fn list(&self) -> Result<Vec<BookDocument>, StoreError>;

    /// Persist a document and return it with its generated identifier.
    async fn insert(&self, book: DocumentBook) -> Result<BookDocument, StoreError>;
}

/// Fixed-schema book table keyed by an auto-increment id.
#[async_trait]
pub trait RelationalBookStore: Send + Sync {
    async fn list(&self) -> Result<Vec<BookRow>, StoreError>;

    /// Returns the generated identifier.
    async fn insert(&self, book: &BookInput) -> Result<u64, StoreError>;

    /// Returns the number of rows matched by `id`.
    async fn update(&self, id: i64, book: &BookInput) -> Result<u64, StoreError>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64, StoreError>;
}
