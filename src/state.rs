use crate::error::ResolveError;

/// How a resolution attempt failed, from the UI's point of view. The two
/// cases render differently ("loading failed" offers retry, "no channels"
/// does not pretend anything broke).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    LoadingFailed,
    NoChannels,
}

impl From<&ResolveError> for FetchFailure {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::NoProviderAvailable { .. } => FetchFailure::LoadingFailed,
            ResolveError::EmptyResult { .. } => FetchFailure::NoChannels,
        }
    }
}

/// Which error the UI is showing, with enough context to recover from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Provider chain exhausted; retry re-selects the same key.
    LoadingFailed { key: String },
    /// Resolution succeeded but produced nothing.
    NoChannels { key: String },
    /// Playback surface reported an error. The resolved list is still
    /// valid; going back returns to it.
    Playback { key: String, page: usize, channel_id: String },
}

/// View state for the region → channels → player flow, kept as an explicit
/// machine so the pipeline stays decoupled from presentation code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    SelectingRegion,
    LoadingChannels { key: String },
    BrowsingChannels { key: String, page: usize },
    Playing { key: String, page: usize, channel_id: String },
    Error(ErrorKind),
}

/// Transition inputs. Selecting a region is legal from any state
/// (last-selection-wins); inputs that make no sense in the current state
/// leave it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SelectRegion(String),
    FetchSucceeded,
    FetchFailed(FetchFailure),
    SelectChannel(String),
    GoBack,
    PlaybackStarted,
    PlaybackError,
}

impl ViewState {
    /// Pure transition function; total over (state, input).
    pub fn apply(self, input: Input) -> ViewState {
        use ViewState::*;

        match (self, input) {
            (_, Input::SelectRegion(key)) => LoadingChannels { key },

            (LoadingChannels { key }, Input::FetchSucceeded) => BrowsingChannels { key, page: 0 },
            (LoadingChannels { key }, Input::FetchFailed(failure)) => Error(match failure {
                FetchFailure::LoadingFailed => ErrorKind::LoadingFailed { key },
                FetchFailure::NoChannels => ErrorKind::NoChannels { key },
            }),
            (LoadingChannels { .. }, Input::GoBack) => SelectingRegion,

            (BrowsingChannels { key, page }, Input::SelectChannel(channel_id)) => {
                Playing { key, page, channel_id }
            }
            (BrowsingChannels { .. }, Input::GoBack) => SelectingRegion,

            (Playing { key, page, channel_id }, Input::PlaybackError) => {
                Error(ErrorKind::Playback { key, page, channel_id })
            }
            (Playing { key, page, .. }, Input::GoBack) => BrowsingChannels { key, page },

            // Playback recovered on its own; clear the shown error.
            (Error(ErrorKind::Playback { key, page, channel_id }), Input::PlaybackStarted) => {
                Playing { key, page, channel_id }
            }
            (Error(ErrorKind::Playback { key, page, .. }), Input::GoBack) => {
                BrowsingChannels { key, page }
            }
            (Error(_), Input::GoBack) => SelectingRegion,

            (state, _) => state,
        }
    }

    /// The input a "retry" action should feed back in, where one applies.
    pub fn retry(&self) -> Option<Input> {
        match self {
            ViewState::Error(ErrorKind::LoadingFailed { key }) => {
                Some(Input::SelectRegion(key.clone()))
            }
            _ => None,
        }
    }
}
