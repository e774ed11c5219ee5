// Dataset loading: upstream fetch, Redis-backed cache, and the loader that
// decides between them. Only the loader writes to the cache.

pub mod cache;
pub mod loader;
pub mod source;

pub use cache::RedisDatasetCache;
pub use loader::{DatasetError, DatasetLoader};
pub use source::HttpDatasetSource;
