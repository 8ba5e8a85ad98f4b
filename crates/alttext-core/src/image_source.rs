//! Image delivery: decide whether and how the image travels with the prompt.
//!
//! Two paths exist. The URL path hands the provider a public URL (optionally
//! rewritten onto a public host and HEAD-probed first). The inline path reads
//! the local file and embeds it as a base64 data URI, subject to a size cap.
//! The configured mode picks which path runs first; the other is the
//! fallback; if both fail the request goes out text-only.

use crate::config::{VisionConfig, VisionMode};
use crate::types::{ImageSource, SubjectContext};
use async_trait::async_trait;
use base64::Engine;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Checks whether a URL can be fetched by a remote provider.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// True when the URL answers with a non-error status below 400.
    async fn is_reachable(&self, url: &str) -> bool;
}

/// HEAD-request probe.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build probe client ({e}), using defaults");
                reqwest::Client::new()
            });
        Self { client }
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                tracing::trace!("HEAD {url} -> {status}");
                status < 400
            }
            Err(e) => {
                tracing::debug!("HEAD {url} failed: {e}");
                false
            }
        }
    }
}

/// Resolves the [`ImageSource`] for one suggestion.
///
/// Holds no per-subject state; every call recomputes from scratch because
/// reachability and file size can change between calls.
#[derive(Clone)]
pub struct ImageSourceResolver {
    probe: Arc<dyn ReachabilityProbe>,
}

impl ImageSourceResolver {
    pub fn new(probe: Arc<dyn ReachabilityProbe>) -> Self {
        Self { probe }
    }

    /// Resolver with an HTTP HEAD probe.
    pub fn with_http_probe(timeout: Duration) -> Self {
        Self::new(Arc::new(HttpProbe::new(timeout)))
    }

    /// Pick the image source for a subject.
    pub async fn resolve(&self, context: &SubjectContext, vision: &VisionConfig) -> ImageSource {
        if !vision.enabled {
            return ImageSource::None;
        }

        let candidates = candidate_urls(context, vision);
        let source = match vision.mode {
            VisionMode::Base64 => match inline_source(context, vision.max_inline_bytes).await {
                Some(source) => Some(source),
                None => self.url_source(&candidates, vision).await,
            },
            VisionMode::Url | VisionMode::Auto => match self.url_source(&candidates, vision).await
            {
                Some(source) => Some(source),
                None => inline_source(context, vision.max_inline_bytes).await,
            },
        };

        let source = source.unwrap_or_default();
        tracing::debug!(
            attachment_id = context.attachment_id,
            mode = %vision.mode,
            resolved = %source.mode(),
            "Resolved image source"
        );
        source
    }

    /// First candidate that is accepted (or reachable, when probing is on).
    async fn url_source(
        &self,
        candidates: &[String],
        vision: &VisionConfig,
    ) -> Option<ImageSource> {
        for url in candidates {
            if !vision.verify_url_reachable || self.probe.is_reachable(url).await {
                return Some(ImageSource::Url(url.clone()));
            }
            tracing::debug!("Image URL not reachable, skipping: {url}");
        }
        None
    }
}

/// Candidate URLs in preference order: the public URL, then the same URL
/// rewritten onto the configured public host.
pub fn candidate_urls(context: &SubjectContext, vision: &VisionConfig) -> Vec<String> {
    let mut urls = Vec::new();
    let Some(original) = context
        .public_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return urls;
    };
    urls.push(original.to_string());

    if let Some(public_host) = vision.public_host.as_deref() {
        if let Some(rewritten) = rewrite_host(original, public_host, &vision.public_scheme) {
            if !urls.contains(&rewritten) {
                urls.push(rewritten);
            }
        }
    }

    urls
}

/// Rebuild `url` on `host` with `scheme`, keeping path and query.
///
/// Returns `None` when the URL has no host or already uses `host`.
fn rewrite_host(url: &str, host: &str, scheme: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let current = parsed.host_str()?;
    if current.eq_ignore_ascii_case(host) {
        return None;
    }
    let query = parsed.query().map(|q| format!("?{q}")).unwrap_or_default();
    Some(format!("{scheme}://{host}{}{query}", parsed.path()))
}

/// Read the local file and encode it as a data URI, if it fits.
async fn inline_source(context: &SubjectContext, max_bytes: u64) -> Option<ImageSource> {
    let path = context.local_file_path.as_deref()?;
    let bytes = read_capped(path, max_bytes).await?;
    let mime = match context.mime_type.trim() {
        "" => FALLBACK_MIME,
        mime => mime,
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Some(ImageSource::Base64(format!("data:{mime};base64,{encoded}")))
}

async fn read_capped(path: &Path, max_bytes: u64) -> Option<Vec<u8>> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return None,
        Err(e) => {
            tracing::debug!("Cannot inline {path:?}: {e}");
            return None;
        }
    };
    if metadata.len() > max_bytes {
        tracing::debug!(
            "Cannot inline {path:?}: {} bytes exceeds limit of {max_bytes}",
            metadata.len()
        );
        return None;
    }
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.len() as u64 <= max_bytes => Some(bytes),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Cannot read {path:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Probe answering from a fixed set of reachable URLs and recording calls.
    #[derive(Default)]
    struct FakeProbe {
        reachable: HashSet<String>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        fn reaching(urls: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                reachable: urls.iter().map(|u| u.to_string()).collect(),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl ReachabilityProbe for FakeProbe {
        async fn is_reachable(&self, url: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(url.to_string());
            self.reachable.contains(url)
        }
    }

    fn context(url: Option<&str>, file: Option<&Path>) -> SubjectContext {
        SubjectContext {
            attachment_id: 1,
            mime_type: "image/png".into(),
            public_url: url.map(String::from),
            local_file_path: file.map(Path::to_path_buf),
            ..Default::default()
        }
    }

    fn vision(mode: VisionMode) -> VisionConfig {
        VisionConfig {
            mode,
            ..Default::default()
        }
    }

    fn write_image(dir: &tempfile::TempDir, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_candidate_urls_rewrites_host() {
        let ctx = context(Some("http://localhost:8080/uploads/a.png?v=2"), None);
        let config = VisionConfig {
            public_host: Some("cdn.example.com".into()),
            ..Default::default()
        };
        assert_eq!(
            candidate_urls(&ctx, &config),
            vec![
                "http://localhost:8080/uploads/a.png?v=2".to_string(),
                "https://cdn.example.com/uploads/a.png?v=2".to_string(),
            ]
        );
    }

    #[test]
    fn test_candidate_urls_same_host_not_duplicated() {
        let ctx = context(Some("https://cdn.example.com/a.png"), None);
        let config = VisionConfig {
            public_host: Some("cdn.example.com".into()),
            ..Default::default()
        };
        assert_eq!(candidate_urls(&ctx, &config).len(), 1);
    }

    #[test]
    fn test_candidate_urls_empty_without_public_url() {
        let ctx = context(Some("  "), None);
        assert!(candidate_urls(&ctx, &VisionConfig::default()).is_empty());
    }

    #[tokio::test]
    async fn test_disabled_vision_returns_none() {
        let probe = FakeProbe::reaching(&[]);
        let resolver = ImageSourceResolver::new(probe.clone());
        let config = VisionConfig {
            enabled: false,
            ..Default::default()
        };
        let source = resolver
            .resolve(&context(Some("https://a.test/x.png"), None), &config)
            .await;
        assert_eq!(source, ImageSource::None);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_url_mode_without_verification_skips_probe() {
        let probe = FakeProbe::reaching(&[]);
        let resolver = ImageSourceResolver::new(probe.clone());
        let source = resolver
            .resolve(
                &context(Some("https://a.test/x.png"), None),
                &vision(VisionMode::Url),
            )
            .await;
        assert_eq!(source, ImageSource::Url("https://a.test/x.png".into()));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_probe_falls_through_to_rewritten_url() {
        let probe = FakeProbe::reaching(&["https://cdn.example.com/x.png"]);
        let resolver = ImageSourceResolver::new(probe.clone());
        let config = VisionConfig {
            verify_url_reachable: true,
            public_host: Some("cdn.example.com".into()),
            ..Default::default()
        };
        let source = resolver
            .resolve(&context(Some("http://wp.local/x.png"), None), &config)
            .await;
        assert_eq!(
            source,
            ImageSource::Url("https://cdn.example.com/x.png".into())
        );
        assert_eq!(
            *probe.seen.lock().unwrap(),
            vec![
                "http://wp.local/x.png".to_string(),
                "https://cdn.example.com/x.png".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_auto_unreachable_url_falls_back_to_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir, &[0x89, 0x50, 0x4E, 0x47]);
        let resolver = ImageSourceResolver::new(FakeProbe::reaching(&[]));
        let config = VisionConfig {
            verify_url_reachable: true,
            ..Default::default()
        };
        let source = resolver
            .resolve(&context(Some("http://wp.local/x.png"), Some(&path)), &config)
            .await;
        assert_eq!(
            source,
            ImageSource::Base64("data:image/png;base64,iVBORw==".into())
        );
    }

    #[tokio::test]
    async fn test_base64_mode_prefers_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir, &[1, 2, 3]);
        let probe = FakeProbe::reaching(&["https://a.test/x.png"]);
        let resolver = ImageSourceResolver::new(probe.clone());
        let source = resolver
            .resolve(
                &context(Some("https://a.test/x.png"), Some(&path)),
                &vision(VisionMode::Base64),
            )
            .await;
        assert_eq!(source.mode(), crate::types::ImageMode::Base64);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_base64_missing_file_falls_back_to_url() {
        let resolver = ImageSourceResolver::new(FakeProbe::reaching(&[]));
        let missing = Path::new("/definitely/not/here.png");
        let source = resolver
            .resolve(
                &context(Some("https://a.test/x.png"), Some(missing)),
                &vision(VisionMode::Base64),
            )
            .await;
        assert_eq!(source, ImageSource::Url("https://a.test/x.png".into()));
    }

    #[tokio::test]
    async fn test_base64_missing_file_and_no_url_is_none() {
        let resolver = ImageSourceResolver::new(FakeProbe::reaching(&[]));
        let missing = Path::new("/definitely/not/here.png");
        let source = resolver
            .resolve(&context(None, Some(missing)), &vision(VisionMode::Base64))
            .await;
        assert_eq!(source, ImageSource::None);
    }

    #[tokio::test]
    async fn test_oversized_file_is_not_inlined() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir, &[0u8; 64]);
        let resolver = ImageSourceResolver::new(FakeProbe::reaching(&[]));
        let config = VisionConfig {
            mode: VisionMode::Base64,
            max_inline_bytes: 63,
            ..Default::default()
        };
        let source = resolver.resolve(&context(None, Some(&path)), &config).await;
        assert_eq!(source, ImageSource::None);
    }

    #[tokio::test]
    async fn test_inline_defaults_mime_when_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(&dir, &[1, 2, 3]);
        let mut ctx = context(None, Some(&path));
        ctx.mime_type = String::new();
        let resolver = ImageSourceResolver::new(FakeProbe::reaching(&[]));
        let source = resolver.resolve(&ctx, &vision(VisionMode::Auto)).await;
        assert_eq!(
            source,
            ImageSource::Base64("data:application/octet-stream;base64,AQID".into())
        );
    }
}
