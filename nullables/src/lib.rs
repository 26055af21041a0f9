//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies are reached through traits. This crate provides
//! test-friendly implementations that:
//! - Return scripted values
//! - Can be held mid-request and released programmatically
//! - Never touch the network
//!
//! Usage: swap `HttpElectionClient` for [`NullElectionApi`] in tests.

pub mod api;

pub use api::{Endpoint, Gate, NullElectionApi};
