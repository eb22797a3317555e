//! HTTP request building and execution.
//!
//! # Responsibility
//! - Describe requests with a fluent, immutable builder.
//! - Execute described requests and decode JSON responses.
//!
//! # Invariants
//! - URL validation happens in `Request::build`, before any network traffic.
//! - Any non-2xx response surfaces as `NetError::ServerError` with its status.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{Request, RequestDescriptor, RequestMethod};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NetResult<T> = Result<T, NetError>;

/// Request construction or execution error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// The URL could not be parsed or uses a non-HTTP scheme.
    InvalidUrl(String),
    /// The response body was not the expected JSON shape.
    InvalidJson(String),
    /// Transport failure (`code == 0`) or non-success HTTP status.
    ServerError { code: u16, message: String },
    /// A header name or value is not valid HTTP.
    InvalidHeader(String),
}

impl NetError {
    /// HTTP status for server errors; `0` means no response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl Display for NetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(url) => write!(f, "invalid url `{url}`"),
            Self::InvalidJson(message) => write!(f, "invalid json response: {message}"),
            Self::ServerError { code: 0, message } => write!(f, "request failed: {message}"),
            Self::ServerError { code, message } => {
                write!(f, "server responded with status {code}: {message}")
            }
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
        }
    }
}

impl Error for NetError {}
