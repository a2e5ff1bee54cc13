//! # CLI Module
//!
//! Command implementations behind the `nowplaying-proxy` binary. Each
//! function takes the already loaded [`crate::config::Config`] and reports
//! through the crate's status macros (`info!`, `success!`, `warning!`).
//!
//! ## Commands
//!
//! - [`serve`] - run the HTTP service
//! - [`set_refresh_token`] - provision the refresh token into the store
//! - [`check_refresh_token`] - verify client credentials and refresh token
//!
//! ## Usage Patterns
//!
//! ```bash
//! nowplaying-proxy refresh-token set AQD...   # once, with a persistent KV_BACKEND
//! nowplaying-proxy refresh-token check
//! nowplaying-proxy serve --addr 0.0.0.0:8787
//! ```

mod refresh_token;
mod serve;

pub use refresh_token::check_refresh_token;
pub use refresh_token::set_refresh_token;
pub use serve::serve;
