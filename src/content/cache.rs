//! Caching implementations for content types.

use serde_json::Value;

use crate::cache::{CacheKey, Cacheable};

use super::api_types::{
  normalize_about, ApiAboutContent, ApiHomepageContent, ApiPortfolioProject, ApiPost, ApiService,
};
use super::types::{AboutContent, HomepageContent, PortfolioProject, Post, Service};

// ============================================================================
// Cacheable implementations
// ============================================================================

impl Cacheable for Post {
  fn from_payload(payload: Value) -> serde_json::Result<Self> {
    serde_json::from_value::<ApiPost>(payload).map(Post::from)
  }

  fn content_type() -> &'static str {
    "post"
  }
}

impl Cacheable for PortfolioProject {
  fn from_payload(payload: Value) -> serde_json::Result<Self> {
    serde_json::from_value::<ApiPortfolioProject>(payload).map(PortfolioProject::from)
  }

  fn content_type() -> &'static str {
    "portfolio project"
  }
}

impl Cacheable for Service {
  fn from_payload(payload: Value) -> serde_json::Result<Self> {
    serde_json::from_value::<ApiService>(payload).map(Service::from)
  }

  fn content_type() -> &'static str {
    "service"
  }
}

impl Cacheable for AboutContent {
  fn from_payload(payload: Value) -> serde_json::Result<Self> {
    serde_json::from_value::<Option<ApiAboutContent>>(payload).map(normalize_about)
  }

  fn content_type() -> &'static str {
    "about content"
  }
}

impl Cacheable for HomepageContent {
  fn from_payload(payload: Value) -> serde_json::Result<Self> {
    serde_json::from_value::<Option<ApiHomepageContent>>(payload)
      .map(|content| content.unwrap_or_default().into())
  }

  fn content_type() -> &'static str {
    "homepage content"
  }
}

// ============================================================================
// Content keys
// ============================================================================

/// Logical keys for content API calls.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContentKey {
  Posts,
  Portfolio,
  Services,
  /// About content for one slug
  About { slug: String },
  Homepage,
}

impl ContentKey {
  /// Endpoint path (and query) relative to the API base URL.
  pub fn endpoint(&self) -> String {
    match self {
      Self::Posts => "/api/v1/posts".to_string(),
      Self::Portfolio => "/api/v1/portfolio".to_string(),
      Self::Services => "/api/v1/services".to_string(),
      Self::About { slug } => format!("/api/v1/content/about?slug={}", encode_slug(slug)),
      Self::Homepage => "/api/v1/content/homepage".to_string(),
    }
  }
}

fn encode_slug(slug: &str) -> String {
  url::form_urlencoded::byte_serialize(slug.as_bytes()).collect()
}

impl CacheKey for ContentKey {
  fn cache_id(&self) -> String {
    match self {
      Self::Posts => "posts".to_string(),
      Self::Portfolio => "portfolio".to_string(),
      Self::Services => "services".to_string(),
      Self::About { slug } => format!("about:{}", slug),
      Self::Homepage => "homepage".to_string(),
    }
  }

  fn file_name(&self) -> String {
    match self {
      Self::Posts => "remote-posts.json".to_string(),
      Self::Portfolio => "remote-portfolios.json".to_string(),
      Self::Services => "remote-services.json".to_string(),
      // Encoded so distinct slugs never share a file and none escapes the cache directory
      Self::About { slug } => format!("content-about-{}.json", encode_slug(slug)),
      Self::Homepage => "content-homepage.json".to_string(),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::Posts => "blog posts".to_string(),
      Self::Portfolio => "portfolio projects".to_string(),
      Self::Services => "services".to_string(),
      Self::About { slug } => format!("about content ({})", slug),
      Self::Homepage => "homepage content".to_string(),
    }
  }
}
