//! URL-shortening collaborator.
//!
//! Shortening is a service owned by the surrounding pipeline; this crate
//! only defines the seam and the fallback policy.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Shortener failures.
#[derive(Debug, Error)]
pub enum ShortenError {
    /// The shortening service could not be reached or rejected the URL.
    #[error("shortener unavailable: {0}")]
    Unavailable(String),
}

/// External collaborator that turns long URLs into short ones.
#[async_trait]
pub trait UrlShortener: Send + Sync {
    /// Shorten one URL.
    async fn shorten(&self, url: &str) -> Result<String, ShortenError>;
}

/// Pass-through shortener used when no service is wired in.
#[derive(Debug, Default)]
pub struct Identity;

#[async_trait]
impl UrlShortener for Identity {
    async fn shorten(&self, url: &str) -> Result<String, ShortenError> {
        Ok(url.to_string())
    }
}

/// Shorten with fallback: a shortener failure must never abort dispatch,
/// the long URL is delivered instead.
pub async fn shorten_or_original(shortener: &dyn UrlShortener, url: &str) -> String {
    match shortener.shorten(url).await {
        Ok(short) => short,
        Err(e) => {
            warn!(url, error = %e, "url shortener failed, sending original url");
            url.to_string()
        }
    }
}
