//! Core types for the PureSkin gateway.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod product_key;
pub mod source;

pub use email::{Email, EmailError};
pub use id::*;
pub use product_key::ProductKey;
pub use source::FavoriteSource;
