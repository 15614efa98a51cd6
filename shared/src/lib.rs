//! Shared types for the loyalty scan console
//!
//! Common types used by the scan engine and server-side tooling:
//! member records, card design configuration, reward structures and
//! the wire DTOs of the directory and wallet-provider APIs.

pub mod client;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};
