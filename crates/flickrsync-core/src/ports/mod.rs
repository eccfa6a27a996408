//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the sync engine
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ILocalFileIndex`] - Enumerates eligible photos under the library root
//! - [`IRecordStore`] - Persistent record of uploaded photos and created albums
//! - [`IRemoteGateway`] - Photo and album operations against Flickr

pub mod file_index;
pub mod record_store;
pub mod remote_gateway;

pub use file_index::ILocalFileIndex;
pub use record_store::IRecordStore;
pub use remote_gateway::IRemoteGateway;
