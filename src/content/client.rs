use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::ContentError;

/// Content API client
///
/// Issues plain JSON GETs; caching and normalization live above it.
#[derive(Clone)]
pub struct ContentClient {
  http: reqwest::Client,
  base_url: Option<Url>,
}

impl ContentClient {
  pub fn new(config: &Config) -> Result<Self> {
    Self::from_parts(
      config.api.base_url.clone(),
      config.api.timeout_secs.map(Duration::from_secs),
    )
  }

  /// Build a client without a config file.
  ///
  /// A missing base URL is not an error here; it only fails the first call
  /// that actually needs the network.
  pub fn from_parts(base_url: Option<Url>, timeout: Option<Duration>) -> Result<Self> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  /// Resolve an endpoint against the base URL.
  ///
  /// An absolute endpoint path replaces any path on the base URL.
  pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ContentError> {
    let base = self
      .base_url
      .as_ref()
      .ok_or_else(ContentError::missing_base_url)?;

    base
      .join(endpoint)
      .map_err(|e| ContentError::Configuration(format!("Invalid endpoint {}: {}", endpoint, e)))
  }

  /// GET an endpoint and return its JSON body.
  pub async fn get_json(&self, endpoint: &str) -> Result<Value, ContentError> {
    let url = self.endpoint_url(endpoint)?;
    debug!(%url, "GET");

    let response = self
      .http
      .get(url)
      .header(ACCEPT, HeaderValue::from_static("application/json"))
      .send()
      .await
      .map_err(|e| ContentError::Network {
        endpoint: endpoint.to_string(),
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
      })?;

    let status = response.status();
    if !status.is_success() {
      return Err(ContentError::Network {
        endpoint: endpoint.to_string(),
        status: Some(status.as_u16()),
        message: status.to_string(),
      });
    }

    response
      .json::<Value>()
      .await
      .map_err(|e| ContentError::InvalidPayload {
        content: endpoint.to_string(),
        message: e.to_string(),
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use httpmock::prelude::*;
  use serde_json::json;

  fn client_for(server: &MockServer) -> ContentClient {
    let base = Url::parse(&server.base_url()).unwrap();
    ContentClient::from_parts(Some(base), None).unwrap()
  }

  #[test]
  fn test_endpoint_replaces_base_path() {
    let base = Url::parse("https://cms.example.com/some/prefix/").unwrap();
    let client = ContentClient::from_parts(Some(base), None).unwrap();
    assert_eq!(
      client.endpoint_url("/api/v1/posts").unwrap().as_str(),
      "https://cms.example.com/api/v1/posts"
    );
  }

  #[test]
  fn test_endpoint_keeps_query() {
    let base = Url::parse("https://cms.example.com").unwrap();
    let client = ContentClient::from_parts(Some(base), None).unwrap();
    assert_eq!(
      client
        .endpoint_url("/api/v1/content/about?slug=default")
        .unwrap()
        .as_str(),
      "https://cms.example.com/api/v1/content/about?slug=default"
    );
  }

  #[tokio::test]
  async fn test_missing_base_url_is_configuration_error() {
    let client = ContentClient::from_parts(None, None).unwrap();
    let err = client.get_json("/api/v1/posts").await.unwrap_err();
    assert!(err.is_configuration());
  }

  #[tokio::test]
  async fn test_get_json_sends_accept_header() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/api/v1/posts")
          .header("accept", "application/json");
        then.status(200).json_body(json!([{"id": 1}]));
      })
      .await;

    let body = client_for(&server).get_json("/api/v1/posts").await.unwrap();

    mock.assert_async().await;
    assert_eq!(body, json!([{"id": 1}]));
  }

  #[tokio::test]
  async fn test_non_success_status_is_network_error() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/api/v1/services");
        then.status(503);
      })
      .await;

    let err = client_for(&server)
      .get_json("/api/v1/services")
      .await
      .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("503 Service Unavailable"));
  }

  #[tokio::test]
  async fn test_non_json_body_is_invalid_payload() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/api/v1/content/homepage");
        then.status(200).body("<html>maintenance</html>");
      })
      .await;

    let err = client_for(&server)
      .get_json("/api/v1/content/homepage")
      .await
      .unwrap_err();

    assert!(matches!(err, ContentError::InvalidPayload { .. }));
  }
}
