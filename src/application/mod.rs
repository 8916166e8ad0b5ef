//! Application services: the composer and the flows it drives.

pub mod categories;
pub mod composer;
pub mod editor;
pub mod error;
pub mod insertion;
pub mod media;
pub mod notice;
pub mod repos;
pub mod submission;
