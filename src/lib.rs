//! Disk-first, single-flight cache of normalized content from a remote CMS API.
//!
//! Build one [`CachedContentClient`] per process from a [`Config`] and share
//! clones of it. Listings come back in upstream order; apply the functions in
//! [`content::ordering`] for display order.

pub mod cache;
pub mod config;
pub mod content;
pub mod error;

pub use config::Config;
pub use content::CachedContentClient;
pub use error::ContentError;
