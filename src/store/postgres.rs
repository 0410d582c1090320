//! PostgreSQL implementation of [`Store`] backed by an sqlx connection pool.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::columns::Column;
use crate::config::DatabaseConfig;
use crate::store::query::{self, SearchQuery, SqlQuery};
use crate::store::{Record, Store, StoreError};

/// Connection-pooled Postgres store.
///
/// Each query checks a connection out of the pool for its duration only, and
/// is bounded by `query_timeout` including the wait for a free connection.
/// The store is cheaply cloneable and safe to share across tasks.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgStore {
    /// Opens the connection pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> eyre::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        Ok(Self::from_pool(pool, config.query_timeout))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Closes every pooled connection, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(self.query_timeout)),
        }
    }

    /// Runs `query` and decodes the single column of every row as `T`.
    async fn fetch_scalars<T>(&self, query: &SqlQuery) -> Result<Vec<T>, StoreError>
    where
        (T,): for<'r> FromRow<'r, PgRow>,
        T: Send + Unpin + 'static,
    {
        debug!(sql = %query.sql, args = query.args.len(), "executing query");
        let mut statement = sqlx::query_scalar::<_, T>(&query.sql);
        for arg in &query.args {
            statement = statement.bind(arg.as_str());
        }
        self.bounded(statement.fetch_all(&self.pool)).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn unique_values(&self, column: Column) -> Result<Vec<Value>, StoreError> {
        self.fetch_scalars(&query::unique_values(column)).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>, StoreError> {
        self.fetch_scalars::<Value>(&query.build())
            .await?
            .into_iter()
            .map(into_record)
            .collect()
    }

    async fn suggestions(&self, column: Column, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.fetch_scalars(&query::suggestions(column, prefix)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map(|_| ())
    }
}

/// `row_to_json` always yields an object; anything else means the query
/// shape changed underneath us.
fn into_record(value: Value) -> Result<Record, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode {
            column: "row_to_json",
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}
