//! Core types for Velocart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod geo;
pub mod id;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use geo::GeoPoint;
pub use id::*;
pub use slug::{derive_sku, slugify};
pub use status::*;
