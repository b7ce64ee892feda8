pub mod client;
pub mod memory;
pub mod token_store;
pub mod valkey;

pub use client::{CacheClient, CacheError};
pub use memory::MemoryCache;
pub use token_store::{CachedTokenStore, TokenCache};
pub use valkey::ValkeyClient;
