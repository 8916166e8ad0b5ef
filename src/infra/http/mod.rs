//! HTTP adapters for the content-site backend.

mod client;

pub use client::ApiClient;
