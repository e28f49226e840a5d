pub mod analytics;
pub mod cache;
pub mod geo;
pub mod predictions;
pub mod standings;

pub use cache::{CacheCategory, QueryCache};
