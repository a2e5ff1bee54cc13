//! Now-playing proxy library
//!
//! This library implements a small HTTP edge service that answers a single
//! question for a portfolio front-end: "what is playing on Spotify right now?".
//! The Spotify OAuth credentials never leave the service. Callers authenticate
//! with a static shared secret, and the service keeps a short-lived access
//! token cached in a key-value store, refreshing it on a cache miss.
//!
//! # Modules
//!
//! - `api` - HTTP handlers, the shared-secret gate and the fallback responder
//! - `cli` - Command-line entry points (`serve`, `refresh-token`)
//! - `config` - Configuration loaded from environment variables and `.env`
//! - `error` - Error taxonomy and its mapping onto HTTP responses
//! - `management` - Access/refresh token cache and refresh orchestration
//! - `server` - Router assembly, middleware stack and the listener
//! - `spotify` - Spotify token and player endpoint client
//! - `store` - Key-value store backends (memory, file, Cloudflare KV)
//! - `types` - Wire types for upstream payloads and our responses
//!
//! # Example
//!
//! ```
//! use nowplaying_proxy::{cli, config};
//!
//! #[tokio::main]
//! async fn main() -> nowplaying_proxy::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     cli::serve(config).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod store;
pub mod types;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the CLI boundary where any error is reported to the user and
/// turned into an exit code. Library code below the CLI returns the typed
/// errors from [`error`], [`store`] and [`config`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Refresh token stored for '{}'", client_id);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for the CLI layer, before or after the server runs. Request
/// handling never calls this; a failing request gets an error response.
///
/// # Example
///
/// ```
/// error!("Invalid configuration: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("No .env file found, using process environment only");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
