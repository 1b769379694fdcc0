//! HTTP implementation of [`regver_core::registry::Registry`].
//!
//! Talks to the registry's JSON REST API with bearer tokens obtained from an
//! OAuth2 offline (refresh) token.

pub mod auth;
pub mod client;
pub mod error;

pub use client::{ClientConfig, RegistryClient, route};
pub use error::ClientError;
