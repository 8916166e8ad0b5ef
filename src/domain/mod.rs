//! Domain layer types and invariants.

pub mod categories;
pub mod document;
pub mod error;
pub mod identity;
pub mod media;
pub mod posts;
