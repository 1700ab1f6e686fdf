//! Playlist Bridge Library
//!
//! Backend glue between a browser playlist editor and the Spotify Web API.
//! It runs the OAuth login for a browser session, keeps the token on the
//! server side, and exposes a small JSON API that proxies Spotify calls.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the JSON API and the login flow
//! - `config` - Configuration loaded from environment variables and `.env`
//! - `error` - The crate-wide error type and its HTTP mapping
//! - `logging` - Tracing subscriber setup
//! - `management` - Sessions, tokens, the liked-tracks cache and the playlist guard
//! - `server` - Router assembly and the listening loop
//! - `spotify` - Spotify Web API client
//! - `types` - Wire and response data structures
//! - `utils` - Small helpers (PKCE, URIs, artist names)

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::AppError;

/// Result alias used throughout the crate.
///
/// Every fallible operation reports an [`AppError`], which knows how to turn
/// itself into an HTTP response.
pub type Res<T> = std::result::Result<T, AppError>;

/// Prints an informational console line with a blue bullet.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success console line with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error console line and exits the process with code 1.
///
/// Only for startup failures the server cannot recover from.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning console line with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
