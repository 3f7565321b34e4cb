//! PureSkin Core - Shared types library.
//!
//! This crate provides common types used across the PureSkin gateway
//! components:
//! - `gateway` - The authentication + analysis-proxy HTTP service
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, product keys,
//!   and favorite provenance

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
