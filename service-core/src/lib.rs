//! service-core: Shared infrastructure for the invoice sync tooling.
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
