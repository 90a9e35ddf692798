//! Cached content client that wraps ContentClient with disk-first, single-flight caching.

use color_eyre::Result;
use std::path::Path;
use std::sync::Arc;

use crate::cache::{CacheLayer, CacheResult, Cacheable, DiskStorage, FailurePolicy};
use crate::config::Config;
use crate::error::ContentError;

use super::cache::ContentKey;
use super::client::ContentClient;
use super::types::{AboutContent, HomepageContent, PortfolioProject, Post, Service};

/// Slug used for about content when the caller does not name one.
pub const DEFAULT_ABOUT_SLUG: &str = "default";

/// Content client with process-lifetime caching.
///
/// One instance owns the memo for every content type. Clones share it, so
/// build one per process and hand clones to whoever renders pages. Dropping
/// the last clone drops the cache.
#[derive(Clone)]
pub struct CachedContentClient {
  inner: ContentClient,
  posts: CacheLayer<Vec<Post>, DiskStorage>,
  portfolio: CacheLayer<Vec<PortfolioProject>, DiskStorage>,
  services: CacheLayer<Vec<Service>, DiskStorage>,
  about: CacheLayer<AboutContent, DiskStorage>,
  homepage: CacheLayer<HomepageContent, DiskStorage>,
}

impl CachedContentClient {
  /// Create a new cached content client.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = ContentClient::new(config)?;
    Ok(Self::with_client(
      inner,
      &config.cache_dir,
      config.failure_policy,
    ))
  }

  /// Assemble a cache over an existing client and snapshot directory.
  pub fn with_client(inner: ContentClient, cache_dir: &Path, failure_policy: FailurePolicy) -> Self {
    let storage = Arc::new(DiskStorage::new(cache_dir));

    Self {
      inner,
      posts: layer(&storage, failure_policy),
      portfolio: layer(&storage, failure_policy),
      services: layer(&storage, failure_policy),
      about: layer(&storage, failure_policy),
      homepage: layer(&storage, failure_policy),
    }
  }

  /// All blog posts, in upstream order.
  pub async fn posts(&self) -> Result<Vec<Post>, ContentError> {
    Ok(self.posts_with_source().await?.data)
  }

  pub async fn posts_with_source(&self) -> Result<CacheResult<Vec<Post>>, ContentError> {
    self.fetch(&self.posts, ContentKey::Posts).await
  }

  /// Find a post by slug or by stringified id.
  pub async fn post(&self, slug_or_id: &str) -> Result<Option<Post>, ContentError> {
    let posts = self.posts().await?;
    Ok(
      posts
        .into_iter()
        .find(|post| matches_slug_or_id(&post.slug, post.id, slug_or_id)),
    )
  }

  /// All portfolio projects, in upstream order.
  pub async fn portfolio(&self) -> Result<Vec<PortfolioProject>, ContentError> {
    Ok(self.portfolio_with_source().await?.data)
  }

  pub async fn portfolio_with_source(
    &self,
  ) -> Result<CacheResult<Vec<PortfolioProject>>, ContentError> {
    self.fetch(&self.portfolio, ContentKey::Portfolio).await
  }

  /// Find a portfolio project by slug or by stringified id.
  pub async fn project(&self, slug_or_id: &str) -> Result<Option<PortfolioProject>, ContentError> {
    let projects = self.portfolio().await?;
    Ok(
      projects
        .into_iter()
        .find(|project| matches_slug_or_id(&project.slug, project.id, slug_or_id)),
    )
  }

  /// All services, in upstream order.
  pub async fn services(&self) -> Result<Vec<Service>, ContentError> {
    Ok(self.services_with_source().await?.data)
  }

  pub async fn services_with_source(&self) -> Result<CacheResult<Vec<Service>>, ContentError> {
    self.fetch(&self.services, ContentKey::Services).await
  }

  /// Find a service by slug.
  pub async fn service(&self, slug: &str) -> Result<Option<Service>, ContentError> {
    let services = self.services().await?;
    Ok(services.into_iter().find(|service| service.slug == slug))
  }

  /// About content for a slug, memoized per slug.
  pub async fn about(&self, slug: &str) -> Result<AboutContent, ContentError> {
    Ok(self.about_with_source(slug).await?.data)
  }

  pub async fn about_with_source(
    &self,
    slug: &str,
  ) -> Result<CacheResult<AboutContent>, ContentError> {
    let key = ContentKey::About {
      slug: slug.to_string(),
    };
    self.fetch(&self.about, key).await
  }

  /// Homepage sections.
  pub async fn homepage(&self) -> Result<HomepageContent, ContentError> {
    Ok(self.homepage_with_source().await?.data)
  }

  pub async fn homepage_with_source(&self) -> Result<CacheResult<HomepageContent>, ContentError> {
    self.fetch(&self.homepage, ContentKey::Homepage).await
  }

  async fn fetch<T>(
    &self,
    layer: &CacheLayer<T, DiskStorage>,
    key: ContentKey,
  ) -> Result<CacheResult<T>, ContentError>
  where
    T: Cacheable,
  {
    let inner = self.inner.clone();
    let endpoint = key.endpoint();
    layer
      .fetch(&key, move || async move { inner.get_json(&endpoint).await })
      .await
  }
}

fn matches_slug_or_id(slug: &str, id: Option<i64>, slug_or_id: &str) -> bool {
  slug == slug_or_id || id.is_some_and(|id| id.to_string() == slug_or_id)
}

fn layer<T: Cacheable>(
  storage: &Arc<DiskStorage>,
  failure_policy: FailurePolicy,
) -> CacheLayer<T, DiskStorage> {
  CacheLayer::with_shared_storage(Arc::clone(storage)).with_failure_policy(failure_policy)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use httpmock::prelude::*;
  use serde_json::json;
  use url::Url;

  fn cached_client(base_url: Option<String>, dir: &Path) -> CachedContentClient {
    let base = base_url.map(|u| Url::parse(&u).unwrap());
    let inner = ContentClient::from_parts(base, None).unwrap();
    CachedContentClient::with_client(inner, dir, FailurePolicy::Memoize)
  }

  #[tokio::test]
  async fn test_disk_snapshot_means_no_request() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/api/v1/posts");
        then.status(200).json_body(json!([]));
      })
      .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("remote-posts.json"),
      json!([{"id": 1, "title": "Cached", "slug": "cached", "body": ""}]).to_string(),
    )
    .unwrap();

    let client = cached_client(Some(server.base_url()), dir.path());
    let result = client.posts_with_source().await.unwrap();

    assert_eq!(result.source, CacheSource::Disk);
    assert_eq!(result.data[0].title, "Cached");
    mock.assert_calls_async(0).await;
  }

  #[tokio::test]
  async fn test_disk_snapshot_works_without_base_url() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("content-about-default.json"),
      json!({"title": "Hi there", "summary": "Me"}).to_string(),
    )
    .unwrap();

    let client = cached_client(None, dir.path());
    let about = client.about(DEFAULT_ABOUT_SLUG).await.unwrap();
    assert_eq!(about.title, "Hi there");
  }

  #[tokio::test]
  async fn test_concurrent_requests_hit_network_once() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/api/v1/services");
        then
          .status(200)
          .delay(std::time::Duration::from_millis(50))
          .json_body(json!([{"slug": "consulting"}]));
      })
      .await;

    let dir = tempfile::tempdir().unwrap();
    let client = cached_client(Some(server.base_url()), dir.path());

    let (a, b, c) = tokio::join!(client.services(), client.services(), client.service("consulting"));

    mock.assert_calls_async(1).await;
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(c.unwrap().unwrap().title, "Consulting");
  }

  #[tokio::test]
  async fn test_network_failure_stays_memoized() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/api/v1/portfolio");
        then.status(500);
      })
      .await;

    let dir = tempfile::tempdir().unwrap();
    let client = cached_client(Some(server.base_url()), dir.path());

    assert_eq!(client.portfolio().await.unwrap_err().status(), Some(500));
    assert_eq!(client.portfolio().await.unwrap_err().status(), Some(500));
    mock.assert_calls_async(1).await;
  }

  #[tokio::test]
  async fn test_missing_base_url_without_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    let client = cached_client(None, dir.path());
    let err = client.homepage().await.unwrap_err();
    assert!(err.is_configuration());
  }

  #[tokio::test]
  async fn test_about_is_cached_per_slug() {
    let server = MockServer::start_async().await;
    let team = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/api/v1/content/about")
          .query_param("slug", "team");
        then.status(200).json_body(json!({"title": "Team"}));
      })
      .await;
    let default = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/api/v1/content/about")
          .query_param("slug", "default");
        then.status(200).json_body(json!(null));
      })
      .await;

    let dir = tempfile::tempdir().unwrap();
    let client = cached_client(Some(server.base_url()), dir.path());

    assert_eq!(client.about("team").await.unwrap().title, "Team");
    assert_eq!(client.about("team").await.unwrap().title, "Team");
    assert_eq!(
      client.about(DEFAULT_ABOUT_SLUG).await.unwrap(),
      AboutContent::default()
    );

    team.assert_calls_async(1).await;
    default.assert_calls_async(1).await;
  }

  #[tokio::test]
  async fn test_lookups_by_slug_or_id() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("remote-portfolios.json"),
      json!([
        {"id": 4, "title": "Shop", "slug": "shop"},
        {"id": 8, "title": "Blog", "slug": ""}
      ])
      .to_string(),
    )
    .unwrap();

    let client = cached_client(None, dir.path());
    assert_eq!(client.project("shop").await.unwrap().unwrap().id, Some(4));
    assert_eq!(client.project("4").await.unwrap().unwrap().slug, "shop");
    assert_eq!(client.project("8").await.unwrap().unwrap().title, "Blog");
    assert!(client.project("missing").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_untitled_items_keep_the_snapshot_usable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("remote-portfolios.json"),
      json!([
        {"id": 1, "title": "Ok"},
        {"id": 2, "tagline": "Tagline only", "slug": "t"},
        {"title": null, "slug": "no-id"}
      ])
      .to_string(),
    )
    .unwrap();

    let client = cached_client(None, dir.path());
    let result = client.portfolio_with_source().await.unwrap();

    assert_eq!(result.source, CacheSource::Disk);
    let titles: Vec<_> = result.data.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Ok", "Tagline only", "No Id"]);
    assert_eq!(client.project("no-id").await.unwrap().unwrap().id, None);
  }

  #[tokio::test]
  async fn test_homepage_from_network() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/api/v1/content/homepage");
        then.status(200).json_body(json!({
          "services": [{"slug": "design", "title": "Design", "excerpt": "<p>Pixel work</p>"}],
          "posts": [{"id": 3, "slug": "hello", "title": "Hello"}]
        }));
      })
      .await;

    let dir = tempfile::tempdir().unwrap();
    let client = cached_client(Some(server.base_url()), dir.path());
    let first = client.homepage_with_source().await.unwrap();
    let second = client.homepage_with_source().await.unwrap();

    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(second.source, CacheSource::Memory);
    assert_eq!(first.data, second.data);
    assert_eq!(first.data.services[0].description, "Pixel work");
    assert_eq!(first.data.blogs[0].href, "/blog/hello");
    assert!(first.data.portfolios.is_empty());
  }
}
