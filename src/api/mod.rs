//! SpecGen content API: wire types, HTTP client, and the cached wrapper.

pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod types;

pub use cached_client::CachedSpecGenClient;
pub use client::{SpecGenClient, SummaryQuery};
