//! Error types for content loading.
//!
//! Disk snapshot problems never show up here: they are reported as
//! [`DiskRead`](crate::cache::DiskRead) outcomes and fall through to the network.

/// Failure of a content load.
///
/// Cloneable because one single-flight outcome is handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
  #[error("Configuration error: {0}")]
  Configuration(String),

  #[error("Failed to fetch {endpoint}: {message}")]
  Network {
    endpoint: String,
    /// HTTP status when the server answered, `None` on transport failure
    status: Option<u16>,
    message: String,
  },

  #[error("Invalid {content} payload: {message}")]
  InvalidPayload { content: String, message: String },
}

impl ContentError {
  pub fn missing_base_url() -> Self {
    ContentError::Configuration(
      "API base URL is not defined. Set api.base_url, FOLIO_API_BASE_URL or BLOG_API_BASE_URL."
        .to_string(),
    )
  }

  /// HTTP status of a failed response, if any.
  pub fn status(&self) -> Option<u16> {
    match self {
      ContentError::Network { status, .. } => *status,
      _ => None,
    }
  }

  pub fn is_configuration(&self) -> bool {
    matches!(self, ContentError::Configuration(_))
  }
}
