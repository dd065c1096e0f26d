use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AttemptFailure, ProviderAttempt, ResolveError};
use crate::normalize;
use crate::provider::{FeedTransport, ProviderSpec};

/// Raw upstream payload from the first provider that produced a usable one.
#[derive(Debug)]
pub struct RawFeed {
    /// Key of the provider that was accepted.
    pub provider: String,
    pub records: Vec<Value>,
}

/// Walks the provider fallback chain for a selection key. Strictly
/// sequential: provider N+1 is only tried after N failed. No caching; every
/// call is an independent attempt, which is what makes caller-driven retry
/// a plain re-invocation.
pub struct SourceFetcher {
    transport: Arc<dyn FeedTransport>,
    providers: Vec<ProviderSpec>,
}

impl SourceFetcher {
    pub fn new(transport: Arc<dyn FeedTransport>, providers: Vec<ProviderSpec>) -> Self {
        Self { transport, providers }
    }

    /// Accept the first provider whose request succeeds and whose payload
    /// contains at least one record with a playable URL candidate.
    ///
    /// Exhaustion where some provider answered cleanly but had nothing
    /// playable is `EmptyResult`; exhaustion without any well-formed payload
    /// is `NoProviderAvailable`.
    pub async fn fetch(&self, selection_key: &str) -> Result<RawFeed, ResolveError> {
        let key = selection_key.trim().to_lowercase();
        if key.is_empty() {
            return Err(ResolveError::NoProviderAvailable {
                key,
                attempts: Vec::new(),
            });
        }

        let mut attempts: Vec<ProviderAttempt> = Vec::new();
        let mut saw_empty_payload = false;

        for spec in &self.providers {
            let url = spec.request_url(&key);
            let response = match self.transport.get(&url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Provider {} failed for \"{}\": {}", spec.key, key, e);
                    attempts.push(ProviderAttempt {
                        provider: spec.key.to_string(),
                        failure: AttemptFailure::Transport(e.to_string()),
                    });
                    continue;
                }
            };

            if !response.is_success() {
                warn!(
                    "Provider {} returned HTTP {} for \"{}\"",
                    spec.key, response.status, key
                );
                attempts.push(ProviderAttempt {
                    provider: spec.key.to_string(),
                    failure: AttemptFailure::Status(response.status),
                });
                continue;
            }

            let records = match spec.parse(&response.body) {
                Some(records) => records,
                None => {
                    warn!("Provider {} payload failed shape validation for \"{}\"", spec.key, key);
                    attempts.push(ProviderAttempt {
                        provider: spec.key.to_string(),
                        failure: AttemptFailure::BadShape,
                    });
                    continue;
                }
            };

            if records.iter().any(normalize::has_candidate) {
                info!(
                    "Provider {} accepted for \"{}\" ({} raw records)",
                    spec.key,
                    key,
                    records.len()
                );
                return Ok(RawFeed {
                    provider: spec.key.to_string(),
                    records,
                });
            }

            // Well-formed answer, nothing playable in it.
            saw_empty_payload = true;
            attempts.push(ProviderAttempt {
                provider: spec.key.to_string(),
                failure: AttemptFailure::NoValidRecords,
            });
        }

        if saw_empty_payload {
            Err(ResolveError::EmptyResult { key })
        } else {
            Err(ResolveError::NoProviderAvailable { key, attempts })
        }
    }
}
