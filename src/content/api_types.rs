//! Serde-deserializable types matching the content API responses.
//!
//! These types are separate from the canonical view models so that shape
//! validation (serde) runs before any defaulting logic (the conversions below).
//! Disk snapshots hold exactly these shapes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::{AboutContent, HomepageCard, HomepageContent, PortfolioProject, Post, Service};

/// Card descriptions are cut to this many characters.
pub const DESCRIPTION_LIMIT: usize = 280;

/// Card description when upstream provides no text at all.
pub const DESCRIPTION_PLACEHOLDER: &str = "Details coming soon.";

/// Post title when neither a title nor a slug is available.
pub const UNTITLED_POST: &str = "Untitled post";

/// Project title when neither a title, tagline nor slug is available.
pub const UNTITLED_PROJECT: &str = "Untitled project";

// ============================================================================
// List endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPost {
  pub id: Option<i64>,
  pub title: Option<String>,
  pub slug: Option<String>,
  pub excerpt: Option<String>,
  pub body: Option<String>,
  pub published_at: Option<Value>,
  pub cover_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPortfolioProject {
  pub id: Option<i64>,
  pub title: Option<String>,
  pub slug: Option<String>,
  pub tagline: Option<String>,
  pub summary: Option<String>,
  pub body: Option<String>,
  pub thumbnail_url: Option<String>,
  pub hero_image_url: Option<String>,
  pub project_url: Option<String>,
  pub source_url: Option<String>,
  pub tags: Option<Value>,
  pub is_featured: Option<bool>,
  pub sort_order: Option<Value>,
  pub published_at: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiService {
  #[serde(deserialize_with = "deserialize_non_empty")]
  pub slug: String,
  pub title: Option<String>,
  pub subtitle: Option<String>,
  pub excerpt: Option<String>,
  pub body: Option<String>,
  pub cover_image_url: Option<String>,
  pub is_featured: Option<bool>,
  pub sort_order: Option<Value>,
  pub meta: Option<Value>,
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  if s.trim().is_empty() {
    return Err(serde::de::Error::custom("slug must not be empty"));
  }
  Ok(s)
}

// ============================================================================
// Content endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiAboutContent {
  pub title: Option<String>,
  pub summary: Option<String>,
  pub excerpt: Option<String>,
  pub body: Option<String>,
  pub content: Option<String>,
  pub hero_image_url: Option<String>,
  pub cta_label: Option<String>,
  pub cta_url: Option<String>,
  pub skills: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiHomepageService {
  pub slug: Option<String>,
  pub title: Option<String>,
  pub subtitle: Option<String>,
  pub excerpt: Option<String>,
  pub body: Option<String>,
  pub cover_image_url: Option<String>,
  pub is_featured: Option<bool>,
  pub meta: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiHomepagePortfolio {
  pub id: Option<Value>,
  pub title: Option<String>,
  pub slug: Option<String>,
  pub tagline: Option<String>,
  pub summary: Option<String>,
  pub body: Option<String>,
  pub thumbnail_url: Option<String>,
  pub hero_image_url: Option<String>,
  pub tags: Option<Value>,
  pub is_featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiHomepagePost {
  pub id: Option<Value>,
  pub title: Option<String>,
  pub slug: Option<String>,
  pub excerpt: Option<String>,
  pub body: Option<String>,
  pub cover_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiHomepageContent {
  pub portfolios: Option<Vec<Option<ApiHomepagePortfolio>>>,
  pub services: Option<Vec<Option<ApiHomepageService>>>,
  pub posts: Option<Vec<Option<ApiHomepagePost>>>,
  pub blogs: Option<Vec<Option<ApiHomepagePost>>>,
}

// ============================================================================
// Conversions to canonical types
// ============================================================================

impl From<ApiPost> for Post {
  fn from(post: ApiPost) -> Self {
    let slug = non_empty(post.slug);
    let title = resolve_title(post.title, None, slug.as_deref(), UNTITLED_POST);

    Post {
      id: post.id,
      title,
      slug: resolve_slug(slug, post.id),
      excerpt: post.excerpt.unwrap_or_default(),
      body: post.body.unwrap_or_default(),
      published_at: parse_timestamp(post.published_at.as_ref()),
      cover_image_url: post.cover_image_url,
    }
  }
}

impl From<ApiPortfolioProject> for PortfolioProject {
  fn from(project: ApiPortfolioProject) -> Self {
    let slug = non_empty(project.slug);
    let title = resolve_title(
      project.title,
      project.tagline.as_deref(),
      slug.as_deref(),
      UNTITLED_PROJECT,
    );

    PortfolioProject {
      id: project.id,
      title,
      slug: resolve_slug(slug, project.id),
      tagline: project.tagline.unwrap_or_default(),
      summary: project.summary.unwrap_or_default(),
      body: project.body.unwrap_or_default(),
      thumbnail_url: project.thumbnail_url,
      hero_image_url: project.hero_image_url,
      project_url: project.project_url,
      source_url: project.source_url,
      tags: normalize_meta(project.tags.as_ref()),
      is_featured: project.is_featured.unwrap_or(false),
      sort_order: sort_order_or_last(project.sort_order.as_ref()),
      published_at: parse_timestamp(project.published_at.as_ref()),
    }
  }
}

impl From<ApiService> for Service {
  fn from(service: ApiService) -> Self {
    let title = service
      .title
      .or_else(|| service.subtitle.clone())
      .unwrap_or_else(|| humanize_slug(&service.slug));

    Service {
      title,
      subtitle: service.subtitle,
      excerpt: service.excerpt,
      body: service.body.unwrap_or_default(),
      cover_image_url: service.cover_image_url,
      is_featured: service.is_featured.unwrap_or(false),
      sort_order: sort_order_or_last(service.sort_order.as_ref()),
      tags: normalize_meta(service.meta.as_ref()),
      slug: service.slug,
    }
  }
}

impl From<ApiAboutContent> for AboutContent {
  fn from(about: ApiAboutContent) -> Self {
    AboutContent {
      title: about.title.unwrap_or_else(|| AboutContent::default().title),
      summary: about.summary.or(about.excerpt).unwrap_or_default(),
      body: about.body.or(about.content).unwrap_or_default(),
      hero_image_url: about.hero_image_url,
      cta_label: about.cta_label,
      cta_url: about.cta_url,
      skills: normalize_meta(about.skills.as_ref()),
    }
  }
}

/// Normalize an about payload; `None` means upstream sent nothing at all.
pub fn normalize_about(payload: Option<ApiAboutContent>) -> AboutContent {
  payload.map(AboutContent::from).unwrap_or_default()
}

impl ApiHomepageService {
  pub fn into_card(self) -> HomepageCard {
    let slug = non_empty(self.slug);
    let title = self
      .title
      .or(self.subtitle)
      .or_else(|| slug.as_deref().map(humanize_slug))
      .unwrap_or_else(|| "Service".to_string());

    HomepageCard {
      id: slug.clone().unwrap_or_else(random_token),
      title,
      description: fallback_description(self.excerpt.as_deref(), self.body.as_deref()),
      cover_image_url: self.cover_image_url,
      href: section_href("/services", slug.as_deref()),
      tags: Some(normalize_meta(self.meta.as_ref())),
      is_featured: Some(self.is_featured.unwrap_or(false)),
    }
  }
}

impl ApiHomepagePortfolio {
  pub fn into_card(self) -> HomepageCard {
    let slug = non_empty(self.slug);

    HomepageCard {
      id: card_id(self.id.as_ref(), slug.as_deref()),
      title: self
        .title
        .or(self.tagline)
        .unwrap_or_else(|| "Portfolio".to_string()),
      description: fallback_description(self.summary.as_deref(), self.body.as_deref()),
      cover_image_url: self.thumbnail_url.or(self.hero_image_url),
      href: section_href("/portfolio", slug.as_deref()),
      tags: Some(normalize_meta(self.tags.as_ref())),
      is_featured: Some(self.is_featured.unwrap_or(false)),
    }
  }
}

impl ApiHomepagePost {
  pub fn into_card(self) -> HomepageCard {
    let slug = non_empty(self.slug);

    HomepageCard {
      id: card_id(self.id.as_ref(), slug.as_deref()),
      title: self.title.unwrap_or_else(|| "Blog post".to_string()),
      description: fallback_description(self.excerpt.as_deref(), self.body.as_deref()),
      cover_image_url: self.cover_image_url,
      href: section_href("/blog", slug.as_deref()),
      tags: None,
      is_featured: None,
    }
  }
}

impl From<ApiHomepageContent> for HomepageContent {
  fn from(content: ApiHomepageContent) -> Self {
    HomepageContent {
      portfolios: content
        .portfolios
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.unwrap_or_default().into_card())
        .collect(),
      services: content
        .services
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.unwrap_or_default().into_card())
        .collect(),
      blogs: content
        .posts
        .or(content.blogs)
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.unwrap_or_default().into_card())
        .collect(),
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|s| !s.is_empty())
}

/// Slug if present, else the stringified id, else a random token.
fn resolve_slug(slug: Option<String>, id: Option<i64>) -> String {
  non_empty(slug)
    .or_else(|| id.map(|id| id.to_string()))
    .unwrap_or_else(random_token)
}

/// Title, else a secondary label, else the humanized upstream slug, else `placeholder`.
fn resolve_title(
  title: Option<String>,
  secondary: Option<&str>,
  slug: Option<&str>,
  placeholder: &str,
) -> String {
  non_empty(title)
    .or_else(|| secondary.filter(|s| !s.is_empty()).map(String::from))
    .or_else(|| slug.map(humanize_slug))
    .unwrap_or_else(|| placeholder.to_string())
}

/// Card id: upstream id if present, else slug, else a random token.
fn card_id(id: Option<&Value>, slug: Option<&str>) -> String {
  let id = match id {
    Some(Value::Number(n)) => Some(n.to_string()),
    Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
    _ => None,
  };
  id.or_else(|| slug.map(String::from))
    .unwrap_or_else(random_token)
}

fn section_href(section: &str, slug: Option<&str>) -> String {
  match slug {
    Some(slug) => format!("{}/{}", section, slug),
    None => section.to_string(),
  }
}

fn random_token() -> String {
  uuid::Uuid::new_v4().to_string()
}

/// Numeric sort order, or `i64::MAX` so the item sorts last.
/// Fractional values are truncated toward zero.
pub fn sort_order_or_last(value: Option<&Value>) -> i64 {
  value
    .and_then(|v| {
      v.as_i64()
        .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    })
    .unwrap_or(i64::MAX)
}

/// Parse an upstream timestamp, falling back to the current time.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` (UTC),
/// `YYYY-MM-DD` (midnight UTC) and numbers as epoch milliseconds.
pub fn parse_timestamp(value: Option<&Value>) -> DateTime<Utc> {
  let parsed = match value {
    Some(Value::String(s)) => parse_timestamp_str(s.trim()),
    Some(Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
    _ => None,
  };
  parsed.unwrap_or_else(Utc::now)
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
      return Some(dt.and_utc());
    }
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}

/// Flatten tag-like metadata into strings.
///
/// Arrays pass through (empty entries and nulls dropped), objects become
/// `"key: value"` entries, null or absent becomes empty.
pub fn normalize_meta(value: Option<&Value>) -> Vec<String> {
  match value {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::Array(items)) => items
      .iter()
      .filter(|item| !item.is_null())
      .map(value_to_string)
      .filter(|s| !s.is_empty())
      .collect(),
    Some(Value::Object(map)) => map
      .iter()
      .map(|(key, value)| format!("{}: {}", key, value_to_string(value)))
      .collect(),
    Some(other) => {
      let s = value_to_string(other);
      if s.is_empty() {
        Vec::new()
      } else {
        vec![s]
      }
    }
  }
}

fn value_to_string(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// "my-slug" -> "My Slug"
pub fn humanize_slug(slug: &str) -> String {
  let mut out = String::with_capacity(slug.len());
  let mut prev_is_word = false;
  for c in slug.chars() {
    let c = if c == '-' || c == '_' { ' ' } else { c };
    let is_word = c.is_ascii_alphanumeric();
    if is_word && !prev_is_word {
      out.push(c.to_ascii_uppercase());
    } else {
      out.push(c);
    }
    prev_is_word = is_word;
  }
  out
}

/// Remove markup tags and collapse whitespace.
pub fn strip_html(input: &str) -> String {
  let mut text = String::with_capacity(input.len());
  let mut rest = input;
  while let Some(start) = rest.find('<') {
    text.push_str(&rest[..start]);
    let after = &rest[start + 1..];
    match after.find('>') {
      Some(end) if end > 0 => rest = &after[end + 1..],
      _ => {
        text.push('<');
        rest = after;
      }
    }
  }
  text.push_str(rest);

  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text card description from the first source with text.
pub fn fallback_description(primary: Option<&str>, secondary: Option<&str>) -> String {
  [primary, secondary]
    .into_iter()
    .flatten()
    .map(strip_html)
    .find(|text| !text.is_empty())
    .map(|text| text.chars().take(DESCRIPTION_LIMIT).collect())
    .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string())
}
