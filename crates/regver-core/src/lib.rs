//! Core types and algorithms for versioning registry items.
//!
//! This crate is deliberately free of HTTP dependencies. The registry is
//! reached only through the [`registry::Registry`] trait; `regver-client`
//! provides the HTTP implementation.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod chain;
pub mod error;
pub mod item;
pub mod merge;
pub mod registry;
pub mod schema;
pub mod update;
pub mod version;
pub mod workflow;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use error::{Error, Result, Step, WorkflowError};
pub use workflow::{WorkflowRequest, run_workflow};
