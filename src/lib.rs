//! Channel-resolution pipeline for the r1 tv front-end.
//!
//! Turns a country or category selection into a page of canonical,
//! playable channel records: a sequential provider fallback chain fetches
//! raw feed data ([`fetcher`]), heterogeneous record shapes are normalized
//! into [`Channel`]s ([`normalize`]), and the result is deduplicated and
//! paged ([`assemble`]). [`Resolver`] ties the stages together and handles
//! last-selection-wins supersession; [`state`] models the surrounding view
//! flow without dragging presentation concerns in here.
//!
//! The pipeline never invents data: a failed resolution surfaces as a typed
//! [`ResolveError`], and retry is always an explicit re-invocation.

pub mod assemble;
pub mod channel;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fetcher;
pub mod m3u;
pub mod normalize;
pub mod provider;
pub mod session;
pub mod state;

pub use channel::{Channel, Page};
pub use config::PipelineConfig;
pub use error::{AttemptFailure, ProviderAttempt, ResolveError};
pub use favorites::{FavoriteEntry, FavoritesStore};
pub use session::{ChannelSession, Resolver};
pub use state::{Input, ViewState};
