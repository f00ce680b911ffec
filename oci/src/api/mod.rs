//! HTTP client for the OCI-style control plane

pub mod client;
pub mod common;
pub mod core;
pub mod error;
pub mod identity;

pub use client::{Client, RetryConfig};
pub use error::ApiError;
