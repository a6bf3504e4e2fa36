//! Configuration and the payload types shared across the crate.

pub mod config;
pub mod models;
