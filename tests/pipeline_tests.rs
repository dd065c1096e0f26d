use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use r1tv::provider::{FeedResponse, FeedTransport, ProviderSpec, ResponseShape};
use r1tv::state::{FetchFailure, Input, ViewState};
use r1tv::{PipelineConfig, ResolveError, Resolver};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// Maps a URL substring to a canned response; anything unmatched 404s.
struct Scripted {
    responses: HashMap<&'static str, FeedResponse>,
}

impl Scripted {
    fn new<const N: usize>(entries: [(&'static str, u16, &str); N]) -> Arc<Self> {
        let responses = entries
            .into_iter()
            .map(|(needle, status, body)| {
                (needle, FeedResponse { status, body: body.to_string() })
            })
            .collect();
        Arc::new(Self { responses })
    }
}

#[async_trait]
impl FeedTransport for Scripted {
    async fn get(&self, url: &str) -> anyhow::Result<FeedResponse> {
        for (needle, response) in &self.responses {
            if url.contains(needle) {
                return Ok(response.clone());
            }
        }
        Ok(FeedResponse { status: 404, body: String::new() })
    }
}

fn providers() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec {
            key: "garden",
            endpoint: "https://garden.example/{key}.json",
            shape: ResponseShape::JsonArray,
        },
        ProviderSpec {
            key: "playlist",
            endpoint: "https://playlist.example/{key}.m3u",
            shape: ResponseShape::M3uPlaylist,
        },
    ]
}

#[tokio::test]
async fn end_to_end_resolution_drops_and_dedupes() {
    init_tracing();
    let body = r#"[
        {"name": "ARD HD", "iptv_urls": ["https://a"]},
        {"name": "ARD HD", "iptv_urls": ["https://a"]},
        {"title": "ZDF", "stream": "rtmp://b"},
        {"name": "Bad"}
    ]"#;
    let transport = Scripted::new([("garden.example/de.json", 200, body)]);
    let resolver = Resolver::with_transport(PipelineConfig::default(), transport, providers());

    let session = resolver.open("de").await.unwrap();
    assert_eq!(session.provider(), "garden");
    assert_eq!(session.channel_count(), 2);

    let page = session.page(0);
    assert!(!page.has_more);
    assert_eq!(page.channels[0].name, "ard");
    assert_eq!(page.channels[0].url, "https://a");
    assert_eq!(page.channels[0].raw_name, "ARD HD");
    assert_eq!(page.channels[1].name, "zdf");
    assert_eq!(page.channels[1].url, "rtmp://b");
}

#[tokio::test]
async fn fallback_to_m3u_provider_when_json_source_is_down() {
    init_tracing();
    let playlist = "#EXTM3U\n\
        #EXTINF:-1 tvg-logo=\"https://logo/ard.png\" group-title=\"News\",ARD\n\
        https://ard.example/live.m3u8\n\
        #EXTINF:0,ZDF HD\n\
        rtmp://zdf.example/live\n";
    let transport = Scripted::new([
        ("garden.example", 500, ""),
        ("playlist.example/de.m3u", 200, playlist),
    ]);
    let resolver = Resolver::with_transport(PipelineConfig::default(), transport, providers());

    let session = resolver.open("DE").await.unwrap();
    assert_eq!(session.provider(), "playlist");
    assert_eq!(session.channel_count(), 2);

    let page = session.page(0);
    assert_eq!(page.channels[0].name, "ard");
    assert_eq!(page.channels[0].logo.as_deref(), Some("https://logo/ard.png"));
    assert_eq!(page.channels[0].source_category.as_deref(), Some("News"));
    assert_eq!(page.channels[1].name, "zdf");
}

#[tokio::test]
async fn exhausted_chain_is_retryable_and_retry_can_succeed() {
    init_tracing();
    // Everything 404s: no provider produced a payload.
    let transport = Scripted::new([]);
    let resolver = Resolver::with_transport(PipelineConfig::default(), transport, providers());

    let err = resolver.open("de").await.unwrap_err();
    assert!(matches!(err, ResolveError::NoProviderAvailable { .. }));
    assert!(err.is_retryable());
    assert_eq!(err.user_message(), "loading failed");

    // Retry is a distinct invocation of the same resolver.
    let state = ViewState::SelectingRegion
        .apply(Input::SelectRegion("de".to_string()))
        .apply(Input::FetchFailed(FetchFailure::from(&err)));
    let retry = state.retry().expect("loading failure offers retry");
    assert_eq!(retry, Input::SelectRegion("de".to_string()));
    assert!(resolver.open("de").await.is_err());
}

#[tokio::test]
async fn clean_empty_answer_is_not_a_failure_to_load() {
    init_tracing();
    let transport = Scripted::new([("garden.example/aq.json", 200, "[]")]);
    let resolver = Resolver::with_transport(PipelineConfig::default(), transport, providers());

    let err = resolver.open("aq").await.unwrap_err();
    assert!(matches!(err, ResolveError::EmptyResult { .. }));
    assert_eq!(err.user_message(), "no channels available");
    assert!(!err.is_retryable());

    let state = ViewState::SelectingRegion
        .apply(Input::SelectRegion("aq".to_string()))
        .apply(Input::FetchFailed(FetchFailure::from(&err)));
    assert!(state.retry().is_none());
}

#[tokio::test]
async fn stale_session_is_detected_after_reselection() {
    init_tracing();
    let body = r#"[{"name":"x","url":"https://x"}]"#;
    let transport = Scripted::new([
        ("garden.example/de.json", 200, body),
        ("garden.example/fr.json", 200, body),
    ]);
    let resolver = Resolver::with_transport(PipelineConfig::default(), transport, providers());

    let stale = resolver.open("de").await.unwrap();
    let current = resolver.open("fr").await.unwrap();

    // Last selection wins: the caller drops the superseded result.
    assert!(!resolver.is_current(&stale));
    assert!(resolver.is_current(&current));
}

#[tokio::test]
async fn paging_with_configured_size_and_load_more() {
    init_tracing();
    let records: Vec<String> = (0..9)
        .map(|i| format!(r#"{{"name":"Channel {i:02}","url":"https://stream/{i}"}}"#))
        .collect();
    let body = format!("[{}]", records.join(","));
    let transport = Scripted::new([("garden.example/de.json", 200, body.as_str())]);
    let config = PipelineConfig { page_size: 4, ..PipelineConfig::default() };
    let resolver = Resolver::with_transport(config, transport, providers());

    let mut session = resolver.open("de").await.unwrap();
    let first = session.page(0);
    assert_eq!(first.channels.len(), 4);
    assert!(first.has_more);

    // "Load more" re-fetches; global dedup keeps the count stable and the
    // earlier pages unchanged.
    resolver.refresh(&mut session).await.unwrap();
    assert_eq!(session.channel_count(), 9);
    assert_eq!(session.page(0), first);

    let last = session.page(2);
    assert_eq!(last.channels.len(), 1);
    assert!(!last.has_more);
}
