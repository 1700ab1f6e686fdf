//! Configuration management for the playlist bridge.
//!
//! Values come from environment variables, optionally seeded from `.env`
//! files. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the working directory
//! 3. `.env` in the local data directory (`<data dir>/playlist-bridge/.env`)
//! 4. Defaults below, where a variable is not required

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use chrono::TimeDelta;

use crate::{AppError, Res, management::CacheConfig};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-library-read user-library-modify playlist-read-private \
     playlist-modify-private playlist-modify-public user-read-playback-state \
     user-modify-playback-state user-read-currently-playing";
pub const DEFAULT_LIKED_CACHE_TTL_SECS: i64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Loads `.env` files into the process environment.
///
/// The data directory file is created lazily: only its parent directory is
/// ensured, a missing file is not an error. Variables already set in the
/// environment are never overwritten.
pub async fn load_env() -> Res<()> {
    dotenv::dotenv().ok();

    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| AppError::Config(e.to_string()))?;
    }
    Ok(())
}

pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playlist-bridge/.env");
    path
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    /// Sent on token requests when set; PKCE alone is enough otherwise.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: String,
    pub frontend_origin: String,
    pub spotify: SpotifyConfig,
    pub cache: CacheConfig,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let server_addr = vars.or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
        let frontend_origin =
            vars.or_default("FRONTEND_ORIGIN", &format!("http://{server_addr}"));

        let spotify = SpotifyConfig {
            client_id: vars.required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: vars.optional("SPOTIFY_API_AUTH_CLIENT_SECRET"),
            redirect_uri: vars.required("SPOTIFY_API_REDIRECT_URI")?,
            scope: vars.or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: vars.or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: vars.or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: vars.or_default("SPOTIFY_API_URL", DEFAULT_API_URL),
        };

        let ttl_secs: i64 = vars.parsed("LIKED_CACHE_TTL_SECS", DEFAULT_LIKED_CACHE_TTL_SECS)?;
        if ttl_secs < 0 {
            return Err(AppError::Config(
                "LIKED_CACHE_TTL_SECS must not be negative".to_string(),
            ));
        }
        let ttl = TimeDelta::try_seconds(ttl_secs).ok_or_else(|| {
            AppError::Config(format!("LIKED_CACHE_TTL_SECS is out of range: {ttl_secs}"))
        })?;
        let cache = CacheConfig {
            ttl,
            ..CacheConfig::default()
        };

        let timeout_secs: u64 = vars.parsed("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            server_addr,
            frontend_origin,
            spotify,
            cache,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &str) -> Res<String> {
        self.optional(name)
            .ok_or_else(|| AppError::Config(format!("{name} must be set")))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, name: &str, default: T) -> Res<T> {
        match self.optional(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("{name} has an invalid value: {raw}"))),
            None => Ok(default),
        }
    }
}
