//! Keydeck Types
//!
//! Shared type definitions for API key records, store payloads, and
//! user-facing notifications used across all Keydeck crates.

pub mod notification;
pub mod schemas;
pub mod error;

pub use notification::*;
pub use schemas::*;
pub use error::*;
