use reqwest::Client;

use crate::{
    AppError, Res,
    config::AppConfig,
    management::{LikedTracksCache, SessionStore, TokenManager},
    spotify::{self, SpotifyClient},
};

/// Process-wide state shared by every request.
pub struct AppState {
    pub config: AppConfig,
    pub http: Client,
    pub sessions: SessionStore,
    pub liked_cache: LikedTracksCache,
}

impl AppState {
    pub fn new(config: AppConfig) -> Res<Self> {
        let http = spotify::build_http_client(config.http_timeout)?;
        let liked_cache = LikedTracksCache::new(config.cache.clone());
        Ok(Self::with_parts(config, http, liked_cache))
    }

    pub fn with_parts(config: AppConfig, http: Client, liked_cache: LikedTracksCache) -> Self {
        Self {
            config,
            http,
            sessions: SessionStore::new(),
            liked_cache,
        }
    }

    /// Builds a Spotify client for the session, refreshing its token when
    /// needed and storing the refreshed token back.
    pub async fn spotify_client(&self, session_id: &str) -> Res<SpotifyClient> {
        let token = self
            .sessions
            .get(session_id)
            .await
            .and_then(|s| s.token)
            .ok_or(AppError::Unauthenticated)?;

        let mut manager = TokenManager::new(token);
        let (access_token, refreshed) = manager
            .get_valid_token(&self.http, &self.config.spotify)
            .await
            .map_err(|e| match e {
                // a revoked or rejected refresh token means logging in again
                AppError::Upstream {
                    status: 400 | 401, ..
                } => AppError::Unauthenticated,
                other => other,
            })?;
        if refreshed {
            let token = manager.into_token();
            self.sessions
                .update(session_id, |s| s.token = Some(token))
                .await;
        }

        Ok(SpotifyClient::new(
            self.http.clone(),
            &self.config.spotify.api_url,
            access_token,
        ))
    }

    /// Spotify user id of the session, fetched once and then remembered.
    pub async fn user_id(&self, session_id: &str, client: &SpotifyClient) -> Res<String> {
        if let Some(id) = self.sessions.get(session_id).await.and_then(|s| s.user_id) {
            return Ok(id);
        }

        let id = client.current_user_id().await?;
        let stored = id.clone();
        self.sessions
            .update(session_id, |s| s.user_id = Some(stored))
            .await;
        Ok(id)
    }
}
