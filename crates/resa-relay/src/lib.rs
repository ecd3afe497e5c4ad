//! Server-side relay that hands booking requests to the workflow webhook.
//!
//! The relay keeps no state between requests. Everything it needs, the configuration and
//! the upstream client, is passed to [`relay::handle`] by the caller.
pub mod config;
pub mod constants;
pub mod error;
pub mod relay;
pub mod upstream;

pub use config::RelayConfig;
pub use relay::{handle, handle_unreadable, RelayResponse, RelayResult};
pub use upstream::{HttpUpstream, Upstream, UpstreamResponse};
