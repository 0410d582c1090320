//! Serialization format for response bodies.
//!
//! Handlers hand their payloads to a [`Format`] instead of picking an encoder
//! themselves, so the body encoding and its `Content-Type` always agree.
//! JSON is encoded with sonic-rs.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::GatewayError;

/// Supported serialization formats.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum Format {
    #[default]
    Json,
}

impl Format {
    /// Returns the MIME content type for this format.
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
        }
    }

    /// Serialize the value to bytes.
    pub fn serialize<T: Serialize>(self, val: &T) -> Result<Vec<u8>, GatewayError> {
        match self {
            Format::Json => Ok(sonic_rs::to_vec(val)?),
        }
    }

    /// Serialize the value into a `200 OK` response with the matching content type.
    pub fn ok<T: Serialize>(self, val: &T) -> Result<Response, GatewayError> {
        let body = self.serialize(val)?;
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.content_type())],
            body,
        )
            .into_response())
    }
}
