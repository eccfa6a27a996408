//! flickrsync Flickr - Flickr API client
//!
//! Provides async client for:
//! - OAuth 1.0a request signing and the out-of-band authorization flow
//! - Photo upload through the Flickr upload endpoint
//! - Photo and photoset (album) operations through the REST endpoint
//! - Fixed-delay pacing of every API call
//!
//! ## Modules
//!
//! - [`auth`] - Authorization flow and token file persistence
//! - [`client`] - Flickr REST/upload HTTP client
//! - [`oauth`] - OAuth 1.0a HMAC-SHA1 signing primitives
//! - [`provider`] - `IRemoteGateway` implementation
//! - [`rate_limit`] - Request pacing

pub mod auth;
pub mod client;
pub mod oauth;
pub mod provider;
pub mod rate_limit;

pub use client::FlickrClient;
pub use oauth::{ConsumerCredentials, OAuthToken};
pub use provider::FlickrGateway;

use thiserror::Error;

/// Error code used when a failure carries no Flickr error code
/// (server errors, malformed replies, network failures)
pub const GENERIC_ERROR_CODE: i32 = -1;

/// Flickr error code for `flickr.photosets.addPhoto`: "Photo already in set"
pub const PHOTO_ALREADY_IN_SET: i32 = 3;

/// Errors that can occur when communicating with the Flickr API
#[derive(Debug, Error)]
pub enum FlickrError {
    /// Flickr answered with `stat="fail"`
    #[error("Flickr API error {code}: {message}")]
    Api {
        /// Flickr error code
        code: i32,
        /// Flickr error message
        message: String,
    },

    /// The HTTP request completed with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The photo file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A request could not be signed
    #[error("Failed to sign request: {0}")]
    Signing(String),
}

impl FlickrError {
    /// The Flickr error code, or [`GENERIC_ERROR_CODE`] when there is none
    pub fn code(&self) -> i32 {
        match self {
            FlickrError::Api { code, .. } => *code,
            _ => GENERIC_ERROR_CODE,
        }
    }

    /// Whether the failure is a server-side or transport hiccup worth one retry
    ///
    /// Client-side problems (unreadable file, 4xx status, an explicit Flickr
    /// error code) are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            FlickrError::Http { status, .. } => *status >= 500,
            FlickrError::Network(_) | FlickrError::InvalidResponse(_) => true,
            FlickrError::Api { code, .. } => *code == GENERIC_ERROR_CODE,
            FlickrError::Io { .. } | FlickrError::Signing(_) => false,
        }
    }
}
