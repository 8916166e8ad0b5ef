pub mod categories;
pub mod fates;
pub mod media;
pub mod posts;
