//! Data store abstraction.
//!
//! Handlers talk to the database only through the [`Store`] trait. The
//! production implementation is [`PgStore`]; tests swap in a fixture store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::columns::Column;

pub mod postgres;
pub mod query;

pub use postgres::PgStore;
pub use query::{Filter, SearchQuery, SqlQuery};

/// One joined `/search` row, keyed by column name.
pub type Record = Map<String, Value>;

/// Maximum number of values returned by [`Store::suggestions`].
pub const SUGGESTION_LIMIT: usize = 50;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected value in column {column}: {message}")]
    Decode {
        column: &'static str,
        message: String,
    },
}

/// Read access to the trial and antibody tables.
#[async_trait]
pub trait Store: Send + Sync {
    /// Distinct, non-null values of `column`, read from the table that owns it.
    async fn unique_values(&self, column: Column) -> Result<Vec<Value>, StoreError>;

    /// Full outer join of trials and antibodies, narrowed by the query's filters.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>, StoreError>;

    /// Up to [`SUGGESTION_LIMIT`] distinct non-empty values of `column`
    /// starting with `prefix`, shortest first.
    async fn suggestions(&self, column: Column, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Round-trips to the database.
    async fn ping(&self) -> Result<(), StoreError>;
}
