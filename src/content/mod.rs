//! Content API: upstream shapes, canonical view models, caching and ordering.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod ordering;
pub mod types;

pub use cache::ContentKey;
pub use cached_client::{CachedContentClient, DEFAULT_ABOUT_SLUG};
pub use client::ContentClient;
pub use types::{AboutContent, HomepageCard, HomepageContent, PortfolioProject, Post, Service};
