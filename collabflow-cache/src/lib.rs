//! CollabFlow Cache - Read-Through Listing Cache
//!
//! This crate implements the side-cache that backs the read-heavy listing
//! endpoints. It provides:
//!
//! - A pluggable [`CacheBackend`] trait with an in-memory implementation
//! - Deterministic listing key derivation
//! - Read-through logic that degrades to a direct store query when the
//!   backend fails
//! - The mutation-to-eviction mapping applied after every write
//!
//! Cached values are the serialized response payloads themselves, so a
//! cache hit returns byte-identical output to the read that populated it.

pub mod invalidation;
pub mod keys;
pub mod memory;
pub mod read_through;
pub mod traits;

pub use invalidation::{invalidate, Mutation};
pub use keys::{
    project_listing_key, task_listing_key, workspace_listing_key, TaskFilter,
    PROJECT_LISTING_TTL, TASK_LISTING_TTL, WORKSPACE_LISTING_TTL,
};
pub use memory::{CacheClock, MemoryCache, SystemCacheClock};
pub use read_through::{ListingFetcher, ListingRead, ReadThroughCache};
pub use traits::{CacheBackend, CacheError, CacheResult};
