//! YouTube Data API v3 client used to resolve the channel a creator typed in.

pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::YoutubeClient;
pub use error::YoutubeError;
pub use types::ChannelInfo;
