//! Command-line host for the provider framework

pub mod commands;
