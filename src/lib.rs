//! # Trial Gateway
//!
//! A read-only HTTP API over a PostgreSQL dataset of clinical trials and the
//! antibodies assessed in them.
//!
//! ## Quick Start
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     trial_gateway::gateway::run().await
//! }
//! ```
//!
//! ## Configuration
//!
//! The gateway is configured via environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LISTEN_ADDR` | `0.0.0.0:8080` | HTTP server listen address |
//! | `REQUEST_TIMEOUT_MS` | `30000` | Request timeout in milliseconds |
//! | `DATABASE_URL` | `postgres://postgres@localhost:5432/clinical_trials` | Postgres connection string |
//! | `DB_MAX_CONNECTIONS` | `10` | Connection pool size |
//! | `DB_MIN_CONNECTIONS` | `0` | Idle connections kept open |
//! | `DB_ACQUIRE_TIMEOUT_MS` | `5000` | Pool checkout timeout |
//! | `DB_QUERY_TIMEOUT_MS` | `10000` | Per-query timeout |
//!
//! ## Endpoints
//!
//! - `GET /unique_values?column=..` - Distinct values of a whitelisted column
//! - `GET /search?..` - Trials joined with antibodies, filtered by substring
//! - `GET /download?format=csv|json&..` - `/search` rows as a file attachment
//! - `GET /suggestions?column=..&query=..` - Prefix autocomplete for a column
//! - `GET /health` - Health check endpoint

pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod gateway;
pub mod store;


pub use columns::{Column, Entity};
pub use config::Config;
pub use error::GatewayError;
pub use format::Format;
