use std::collections::HashSet;

use crate::channel::{Channel, Page};

/// Accumulates normalized channels across fetches for one selection and
/// serves stable, deduplicated pages.
///
/// Dedup identity is the `(name, url)` pair, global across everything fed
/// in so far; first-seen wins and later duplicates are dropped silently.
#[derive(Debug, Default)]
pub struct Assembler {
    channels: Vec<Channel>,
    seen: HashSet<(String, String)>,
    alphabetical: bool,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alphabetical(mut self, alphabetical: bool) -> Self {
        self.alphabetical = alphabetical;
        self
    }

    /// Feed more candidates, preserving source order for everything new.
    pub fn extend<I: IntoIterator<Item = Channel>>(&mut self, candidates: I) {
        for channel in candidates {
            if self.seen.insert(channel.dedup_key()) {
                self.channels.push(channel);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Slice `[index*size, (index+1)*size)` out of the deduplicated
    /// sequence. `has_more` is true iff the sequence extends past the slice.
    pub fn page(&self, index: usize, size: usize) -> Page {
        let mut view: Vec<&Channel> = self.channels.iter().collect();
        if self.alphabetical {
            view.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }

        let start = index.saturating_mul(size).min(view.len());
        let end = start.saturating_add(size).min(view.len());
        Page {
            channels: view[start..end].iter().map(|c| (*c).clone()).collect(),
            index,
            has_more: view.len() > index.saturating_mul(size).saturating_add(size),
        }
    }
}
