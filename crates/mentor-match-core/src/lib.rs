//! # Mentor Match Core
//!
//! Shared, runtime-agnostic logic for Mentor Match: domain records,
//! the collection store abstraction, dashboard aggregation, and the
//! recommendation request/response contract.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. The
//! application crate supplies the network client and the HTTP surface.

pub mod models;
pub mod prompt;
pub mod recommend;
pub mod stats;
pub mod store;
