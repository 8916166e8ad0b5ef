//! Headless authoring core for a content-site admin console.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
