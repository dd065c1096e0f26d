use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::m3u;

/// How a provider shapes its response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// JSON array of channel-shaped objects.
    JsonArray,
    /// Raw M3U playlist text.
    M3uPlaylist,
}

/// Static descriptor of one upstream feed provider. The table of these is
/// the fallback chain, consulted in order; it is not runtime-configurable.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub key: &'static str,
    /// Endpoint template; `{key}` is replaced by the lowercased selection key.
    pub endpoint: &'static str,
    pub shape: ResponseShape,
}

impl ProviderSpec {
    pub fn request_url(&self, selection_key: &str) -> String {
        self.endpoint.replace("{key}", selection_key)
    }

    /// Parse a response body into raw records, or None if the body does not
    /// match this provider's declared shape.
    pub fn parse(&self, body: &str) -> Option<Vec<Value>> {
        match self.shape {
            ResponseShape::JsonArray => match serde_json::from_str::<Value>(body) {
                Ok(Value::Array(records)) => Some(records),
                _ => None,
            },
            ResponseShape::M3uPlaylist => {
                if !m3u::looks_like_m3u(body) {
                    return None;
                }
                Some(m3u::parse(body))
            }
        }
    }
}

/// Default fallback chain, mirroring the sources the front-end uses: the
/// TVGarden raw country feed first, then the iptv-org playlists (per
/// country, then per category — a key of the wrong kind 404s and falls
/// through).
pub fn default_providers() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec {
            key: "tvgarden",
            endpoint:
                "https://raw.githubusercontent.com/TVGarden/tv-garden-channel-list/main/channels/raw/countries/{key}.json",
            shape: ResponseShape::JsonArray,
        },
        ProviderSpec {
            key: "iptv-org-countries",
            endpoint: "https://iptv-org.github.io/iptv/countries/{key}.m3u",
            shape: ResponseShape::M3uPlaylist,
        },
        ProviderSpec {
            key: "iptv-org-categories",
            endpoint: "https://iptv-org.github.io/iptv/categories/{key}.m3u",
            shape: ResponseShape::M3uPlaylist,
        },
    ]
}

/// A provider's raw HTTP answer, status and body only. The pipeline never
/// needs headers or streaming.
#[derive(Debug, Clone)]
pub struct FeedResponse {
    pub status: u16,
    pub body: String,
}

impl FeedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam for provider requests. The reqwest client lives behind
/// this so the fallback chain is testable without a network.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Errors here are transport-level (connect failure, timeout); HTTP
    /// error statuses come back as a normal response.
    async fn get(&self, url: &str) -> Result<FeedResponse>;
}

/// reqwest-backed transport with the per-request timeout the pipeline
/// itself does not enforce.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<FeedResponse> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(FeedResponse { status, body })
    }
}
