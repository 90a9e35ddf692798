//! Listing order for each content type.
//!
//! Orderers copy their input and use a stable sort, so equal items keep
//! their upstream order and the caller's slice is untouched.

use slug::slugify;
use std::cmp::Ordering;

use super::types::{PortfolioProject, Post, Service};

/// Newest first.
pub fn sort_posts_by_published_date(posts: &[Post]) -> Vec<Post> {
  let mut sorted = posts.to_vec();
  sorted.sort_by(|a, b| b.published_at.cmp(&a.published_at));
  sorted
}

/// Featured first, then ascending sort order, then newest first.
pub fn sort_projects_for_listing(projects: &[PortfolioProject]) -> Vec<PortfolioProject> {
  let mut sorted = projects.to_vec();
  sorted.sort_by(|a, b| {
    featured_first(a.is_featured, b.is_featured)
      .then(a.sort_order.cmp(&b.sort_order))
      .then_with(|| b.published_at.cmp(&a.published_at))
  });
  sorted
}

/// Featured first, then ascending sort order, then by title.
pub fn sort_services(services: &[Service]) -> Vec<Service> {
  let mut sorted = services.to_vec();
  sorted.sort_by(|a, b| {
    featured_first(a.is_featured, b.is_featured)
      .then(a.sort_order.cmp(&b.sort_order))
      .then_with(|| compare_titles(&a.title, &b.title))
  });
  sorted
}

fn featured_first(a: bool, b: bool) -> Ordering {
  b.cmp(&a)
}

/// Title order close to a root-locale collation.
///
/// Base letters decide first (accents, case and punctuation ignored), then
/// unaccented before accented, then lowercase before uppercase.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
  slugify(a)
    .cmp(&slugify(b))
    .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
    .then_with(|| a.chars().map(swap_case).cmp(b.chars().map(swap_case)))
}

fn swap_case(c: char) -> char {
  if c.is_uppercase() {
    c.to_lowercase().next().unwrap_or(c)
  } else {
    c.to_uppercase().next().unwrap_or(c)
  }
}
