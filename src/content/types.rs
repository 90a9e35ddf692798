use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  /// Absent when upstream sent no numeric id
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub title: String,
  pub slug: String,
  pub excerpt: String,
  pub body: String,
  pub published_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cover_image_url: Option<String>,
}

/// Portfolio project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioProject {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub title: String,
  pub slug: String,
  pub tagline: String,
  pub summary: String,
  pub body: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub thumbnail_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hero_image_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub project_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source_url: Option<String>,
  pub tags: Vec<String>,
  pub is_featured: bool,
  /// `i64::MAX` when upstream gave no order
  pub sort_order: i64,
  pub published_at: DateTime<Utc>,
}

/// Service offering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
  pub slug: String,
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subtitle: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub excerpt: Option<String>,
  pub body: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cover_image_url: Option<String>,
  pub is_featured: bool,
  /// `i64::MAX` when upstream gave no order
  pub sort_order: i64,
  /// Flattened `meta` entries
  pub tags: Vec<String>,
}

/// "About" page content for one slug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
  pub title: String,
  pub summary: String,
  pub body: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hero_image_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cta_label: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cta_url: Option<String>,
  pub skills: Vec<String>,
}

impl Default for AboutContent {
  /// Shown when upstream has no about payload at all.
  fn default() -> Self {
    AboutContent {
      title: "About Me".to_string(),
      summary: "Story coming soon.".to_string(),
      body: "<p>Content is on the way.</p>".to_string(),
      hero_image_url: None,
      cta_label: None,
      cta_url: None,
      skills: Vec::new(),
    }
  }
}

/// Card shown in a homepage section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageCard {
  pub id: String,
  pub title: String,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cover_image_url: Option<String>,
  pub href: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_featured: Option<bool>,
}

/// Homepage sections, in upstream order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomepageContent {
  pub portfolios: Vec<HomepageCard>,
  pub services: Vec<HomepageCard>,
  pub blogs: Vec<HomepageCard>,
}
