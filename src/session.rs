use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::assemble::Assembler;
use crate::channel::Page;
use crate::config::PipelineConfig;
use crate::error::ResolveError;
use crate::fetcher::SourceFetcher;
use crate::normalize::Normalizer;
use crate::provider::{default_providers, FeedTransport, HttpTransport, ProviderSpec};

/// Entry point for resolutions. One resolver serves many selections; each
/// `open` call runs the full fetch → normalize → assemble pipeline and
/// yields an independent session.
///
/// The generation counter implements last-selection-wins: opening a new
/// selection supersedes every session opened before it, and the caller
/// checks [`Resolver::is_current`] before applying a completion that may
/// have raced a newer selection. A stale session's result must be dropped,
/// never partially applied.
pub struct Resolver {
    fetcher: SourceFetcher,
    config: PipelineConfig,
    generation: AtomicU64,
}

impl Resolver {
    /// Resolver over HTTP with the default provider table.
    pub fn new(config: PipelineConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport), default_providers()))
    }

    pub fn with_transport(
        config: PipelineConfig,
        transport: Arc<dyn FeedTransport>,
        providers: Vec<ProviderSpec>,
    ) -> Self {
        Self {
            fetcher: SourceFetcher::new(transport, providers),
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Resolve a selection key into a fresh session. Supersedes all prior
    /// sessions even when this resolution ends in a failure (the newer
    /// selection is what the user last asked for).
    pub async fn open(&self, selection_key: &str) -> Result<ChannelSession, ResolveError> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let feed = self.fetcher.fetch(selection_key).await?;
        let normalizer = Normalizer::new(&feed.provider, self.config.display_name_budget);

        let mut assembler = Assembler::new().with_alphabetical(self.config.alphabetical);
        assembler.extend(
            feed.records
                .iter()
                .enumerate()
                .filter_map(|(ordinal, record)| normalizer.normalize(record, ordinal)),
        );

        if assembler.is_empty() {
            return Err(ResolveError::EmptyResult {
                key: selection_key.trim().to_lowercase(),
            });
        }

        info!(
            "Resolved \"{}\" via {}: {} channels after dedup",
            selection_key,
            feed.provider,
            assembler.len()
        );

        Ok(ChannelSession {
            key: selection_key.trim().to_lowercase(),
            provider: feed.provider,
            assembler,
            generation,
            page_size: self.config.page_size,
        })
    }

    /// Whether this session is still the latest selection. Callers drop
    /// results from sessions that are no longer current.
    pub fn is_current(&self, session: &ChannelSession) -> bool {
        self.generation.load(Ordering::Acquire) == session.generation
    }

    /// Re-fetch the session's key and fold new candidates in. Global dedup
    /// silently absorbs everything already seen, so repeats are cheap and
    /// ordering of the existing sequence never changes.
    pub async fn refresh(&self, session: &mut ChannelSession) -> Result<(), ResolveError> {
        let feed = self.fetcher.fetch(&session.key).await?;
        let normalizer = Normalizer::new(&feed.provider, self.config.display_name_budget);
        session.assembler.extend(
            feed.records
                .iter()
                .enumerate()
                .filter_map(|(ordinal, record)| normalizer.normalize(record, ordinal)),
        );
        Ok(())
    }
}

/// One selection's accumulated, deduplicated channel list.
#[derive(Debug)]
pub struct ChannelSession {
    key: String,
    provider: String,
    assembler: Assembler,
    generation: u64,
    page_size: usize,
}

impl ChannelSession {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Provider the list was (first) resolved from.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn channel_count(&self) -> usize {
        self.assembler.len()
    }

    pub fn page(&self, index: usize) -> Page {
        self.assembler.page(index, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FeedResponse, ResponseShape};
    use async_trait::async_trait;

    struct Fixed {
        body: String,
    }

    #[async_trait]
    impl FeedTransport for Fixed {
        async fn get(&self, _url: &str) -> anyhow::Result<FeedResponse> {
            Ok(FeedResponse { status: 200, body: self.body.clone() })
        }
    }

    fn resolver(body: &str, config: PipelineConfig) -> Resolver {
        Resolver::with_transport(
            config,
            Arc::new(Fixed { body: body.to_string() }),
            vec![ProviderSpec {
                key: "test",
                endpoint: "https://test.example/{key}.json",
                shape: ResponseShape::JsonArray,
            }],
        )
    }

    #[tokio::test]
    async fn newer_selection_supersedes_older_session() {
        let r = resolver(r#"[{"name":"x","url":"https://x"}]"#, PipelineConfig::default());
        let first = r.open("de").await.unwrap();
        assert!(r.is_current(&first));

        let second = r.open("fr").await.unwrap();
        assert!(!r.is_current(&first));
        assert!(r.is_current(&second));
    }

    #[tokio::test]
    async fn refresh_accumulates_without_duplicating() {
        let r = resolver(
            r#"[{"name":"ARD","url":"https://a"},{"name":"ZDF","url":"https://b"}]"#,
            PipelineConfig::default(),
        );
        let mut session = r.open("de").await.unwrap();
        assert_eq!(session.channel_count(), 2);

        r.refresh(&mut session).await.unwrap();
        assert_eq!(session.channel_count(), 2);
    }

    #[tokio::test]
    async fn pages_use_the_configured_size() {
        let records: Vec<String> = (0..7)
            .map(|i| format!(r#"{{"name":"ch{i}","url":"https://{i}"}}"#))
            .collect();
        let body = format!("[{}]", records.join(","));
        let config = PipelineConfig { page_size: 4, ..PipelineConfig::default() };

        let r = resolver(&body, config);
        let session = r.open("de").await.unwrap();

        let first = session.page(0);
        assert_eq!(first.channels.len(), 4);
        assert!(first.has_more);

        let second = session.page(1);
        assert_eq!(second.channels.len(), 3);
        assert!(!second.has_more);
    }
}
