//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including identifier validation failures and path decomposition errors.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A photo path that does not live under the photo library root
    #[error("Path {path} is not under library root {root}")]
    OutsideRoot {
        /// The offending photo path
        path: String,
        /// The library root it was decomposed against
        root: String,
    },

    /// Invalid remote photo or album identifier
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),
}
