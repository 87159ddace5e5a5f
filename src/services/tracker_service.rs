//! Redirect resolution and referral tracking
//!
//! Composes the two domain flows on top of the entity registry:
//! - Shorten: generate (or accept) a code and set its destination
//! - Resolve & Track: count the referral, then return the destination

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ShortenerConfig;
use crate::entity::{EntityRegistry, EntitySnapshot};
use crate::errors::{ReflinkerError, Result};
use crate::utils::{generate_random_code, is_valid_short_code, validate_url};

// ============ Request/Response DTOs ============

/// Request to shorten a URL
#[derive(Debug, Clone, Default)]
pub struct ShortenRequest {
    /// Destination URL (missing or blank is rejected)
    pub url: Option<String>,
    /// Short code (optional, will be generated if not provided)
    pub code: Option<String>,
}

impl ShortenRequest {
    pub fn new<T: Into<String>>(url: T) -> Self {
        Self {
            url: Some(url.into()),
            code: None,
        }
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Result of a shorten call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenResult {
    pub code: String,
    pub destination_url: String,
    /// Whether the code was auto-generated
    pub generated_code: bool,
}

// ============ TrackerService Implementation ============

pub struct TrackerService {
    registry: Arc<EntityRegistry>,
    code_length: usize,
    direct_referrer: String,
}

impl TrackerService {
    pub fn new(registry: Arc<EntityRegistry>, code_length: usize, direct_referrer: String) -> Self {
        Self {
            registry,
            code_length,
            direct_referrer,
        }
    }

    pub fn from_config(registry: Arc<EntityRegistry>, config: &ShortenerConfig) -> Self {
        Self::new(
            registry,
            config.code_length,
            config.direct_referrer.clone(),
        )
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn direct_referrer(&self) -> &str {
        &self.direct_referrer
    }

    /// 缺失或空的 Referer 记为直接访问
    pub fn referrer_or_direct<'a>(&'a self, referrer: Option<&'a str>) -> &'a str {
        match referrer.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => &self.direct_referrer,
        }
    }

    /// Shorten flow
    ///
    /// An existing mapping under the same code is overwritten.
    pub async fn shorten(&self, req: ShortenRequest) -> Result<ShortenResult> {
        let url = req
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ReflinkerError::validation("Invalid URL"))?;
        // 目标地址会写入 Location 头
        validate_url(&url)
            .map_err(|e| ReflinkerError::validation(format!("Invalid URL: {}", e)))?;

        let (code, generated) = match req.code.filter(|c| !c.is_empty()) {
            Some(c) => {
                if !is_valid_short_code(&c) {
                    return Err(ReflinkerError::validation(format!(
                        "Invalid short code '{}'. Only alphanumeric, underscore, hyphen and dot allowed.",
                        c
                    )));
                }
                (c, false)
            }
            None => (generate_random_code(self.code_length), true),
        };

        let entity = self.registry.resolve(&code)?;
        if !generated && entity.destination().await?.is_some() {
            warn!("TrackerService: overwriting destination of '{}'", code);
        }
        entity.set_destination(&url).await?;

        info!("TrackerService: shortened '{}' -> '{}'", code, url);
        Ok(ShortenResult {
            code,
            destination_url: url,
            generated_code: generated,
        })
    }

    /// Resolve & Track flow
    ///
    /// The referral is counted even when the code has no destination.
    pub async fn resolve_and_track(&self, code: &str, referrer: Option<&str>) -> Result<String> {
        let referrer = self.referrer_or_direct(referrer);
        let entity = self.registry.resolve(code)?;

        match entity.track_and_resolve(referrer).await? {
            Some(url) => {
                debug!("TrackerService: '{}' via '{}' -> '{}'", code, referrer, url);
                Ok(url)
            }
            None => {
                debug!("TrackerService: no destination for '{}'", code);
                Err(ReflinkerError::not_found(format!(
                    "No destination for short code '{}'",
                    code
                )))
            }
        }
    }

    /// Read-only view for the admin page (no tracking side effect)
    pub async fn inspect(&self, code: &str) -> Result<EntitySnapshot> {
        self.registry.resolve(code)?.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStoreFactory;

    fn service() -> TrackerService {
        let registry = Arc::new(EntityRegistry::new(Arc::new(MemoryStoreFactory)));
        TrackerService::new(registry, 8, "Direct".to_string())
    }

    #[test]
    fn test_referrer_or_direct() {
        let s = service();
        assert_eq!(s.referrer_or_direct(None), "Direct");
        assert_eq!(s.referrer_or_direct(Some("")), "Direct");
        assert_eq!(s.referrer_or_direct(Some("  ")), "Direct");
        assert_eq!(
            s.referrer_or_direct(Some("https://ref.example")),
            "https://ref.example"
        );
    }

    #[tokio::test]
    async fn test_shorten_generates_code_of_configured_length() {
        let s = service();
        let result = s.shorten(ShortenRequest::new("https://example.org")).await.unwrap();
        assert!(result.generated_code);
        assert_eq!(result.code.len(), 8);
        assert_eq!(result.destination_url, "https://example.org");
    }

    #[tokio::test]
    async fn test_shorten_rejects_invalid_custom_code() {
        let s = service();
        let err = s
            .shorten(ShortenRequest::new("https://example.org").with_code("bad/code"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReflinkerError::Validation(_)));
        assert!(s.registry().is_empty());
    }

    #[tokio::test]
    async fn test_shorten_rejects_url_unusable_as_location() {
        let s = service();
        for url in ["https://example.org/a\nb", "javascript:alert(1)", "not a url"] {
            let err = s.shorten(ShortenRequest::new(url)).await.unwrap_err();
            assert!(matches!(err, ReflinkerError::Validation(_)), "{}", url);
        }
        assert!(s.registry().is_empty());
    }
}
