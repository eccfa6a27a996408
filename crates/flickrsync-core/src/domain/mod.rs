//! Domain entities and business logic
//!
//! This module contains the core domain types for flickrsync:
//! - Newtypes for photo paths and Flickr identifiers
//! - Photo and album records kept by the record store
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod photo;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::*;
pub use photo::{AlbumMembership, AlbumPlacement, PhotoRecord};
