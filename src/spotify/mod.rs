//! # Spotify Integration Module
//!
//! A thin async client for the Spotify Web API, authenticated with the bearer
//! token of one browser session.
//!
//! ## Submodules
//!
//! - [`auth`] - authorize URL, code exchange and token refresh
//! - [`library`] - the user's saved ("liked") tracks
//! - [`playlist`] - playlist listing, details and mutations
//! - [`user`] - current user profile and catalog search
//!
//! ## Transport policy
//!
//! Every request goes through [`SpotifyClient::send`]:
//! - `502 Bad Gateway` is retried after a fixed delay
//! - `429 Too Many Requests` waits for `Retry-After` when it is at most
//!   [`MAX_RETRY_AFTER_SECS`], and fails otherwise
//! - `401 Unauthorized` becomes [`AppError::Unauthenticated`]
//! - any other failure status becomes [`AppError::Upstream`] with the body
//!
//! Retries are bounded by [`MAX_ATTEMPTS`].
//!
//! ## Core seam
//!
//! The liked-tracks cache and the playlist guard only talk to Spotify through
//! the [`SpotifyApi`] trait, so they can run against an in-memory fake.

pub mod auth;
pub mod library;
pub mod playlist;
pub mod user;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    AppError, Res,
    types::{PlaylistUrisPage, SavedTracksPage},
};

pub const MAX_ATTEMPTS: u32 = 4;
pub const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Remote operations the caching and mutation logic depends on.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// One page of the user's saved tracks.
    async fn saved_tracks(&self, limit: u32, offset: u32) -> Res<SavedTracksPage>;

    /// One page of a playlist's items, restricted to track URIs and the total.
    async fn playlist_track_uris(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Res<PlaylistUrisPage>;

    /// Appends `uris` to the playlist and returns the service response as is.
    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Res<Value>;
}

/// Builds the shared HTTP client used for every outgoing request.
pub fn build_http_client(timeout: Duration) -> Res<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(AppError::from)
}

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: String,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends the request built by `build`, applying the retry policy.
    ///
    /// `build` is called once per attempt since a sent request is consumed.
    async fn send<F>(&self, build: F) -> Res<Response>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = build(&self.http).bearer_auth(&self.token).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            let retries_left = attempt < MAX_ATTEMPTS;
            match status {
                StatusCode::BAD_GATEWAY if retries_left => {
                    tracing::warn!(attempt, "spotify answered 502, retrying");
                    sleep(BAD_GATEWAY_DELAY).await;
                }
                StatusCode::TOO_MANY_REQUESTS if retries_left => {
                    let retry_after = retry_after_secs(&response);
                    if retry_after > MAX_RETRY_AFTER_SECS {
                        return Err(AppError::Upstream {
                            status: status.as_u16(),
                            message: format!("rate limited for {retry_after} seconds"),
                        });
                    }
                    tracing::warn!(attempt, retry_after, "spotify rate limit hit, waiting");
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::UNAUTHORIZED => return Err(AppError::Unauthenticated),
                _ => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(AppError::Upstream {
                        status: status.as_u16(),
                        message,
                    });
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Res<T> {
        let url = self.url(path);
        let response = self.send(|http| http.get(&url).query(query)).await?;
        Ok(response.json::<T>().await?)
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn saved_tracks(&self, limit: u32, offset: u32) -> Res<SavedTracksPage> {
        SpotifyClient::saved_tracks(self, limit, offset).await
    }

    async fn playlist_track_uris(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Res<PlaylistUrisPage> {
        SpotifyClient::playlist_track_uris(self, playlist_id, limit, offset).await
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Res<Value> {
        SpotifyClient::add_items(self, playlist_id, uris).await
    }
}
