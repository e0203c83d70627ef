//! Provider framework core: contract, registry, discovery and health checks

pub mod config;
pub mod discovery;
pub mod errors;
pub mod health;
pub mod models;
pub mod provider;
pub mod rate_limit;
pub mod registry;
