//! flickrsync Core - Domain types and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `PhotoPath`, `PhotoId`, `AlbumId`, `PhotoRecord`
//! - **Port definitions** - Traits for adapters: `ILocalFileIndex`, `IRecordStore`, `IRemoteGateway`
//! - **Configuration** - YAML configuration with validation
//!
//! # Architecture
//!
//! The domain module contains pure types with no I/O. Ports define trait
//! interfaces that adapter crates implement; the sync engine in
//! `flickrsync-sync` drives them.

pub mod config;
pub mod domain;
pub mod ports;
