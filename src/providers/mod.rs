//! Providers shipped with the framework

pub mod echo;
pub mod mock;
