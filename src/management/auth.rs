use reqwest::Client;

use crate::{Res, config::SpotifyConfig, spotify, types::Token, utils};

/// Seconds before the reported expiry at which a token is already refreshed.
pub const EXPIRY_BUFFER_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    /// Returns a usable access token, refreshing it first when it is about to
    /// expire. The flag tells whether the stored token changed.
    pub async fn get_valid_token(&mut self, http: &Client, cfg: &SpotifyConfig) -> Res<(String, bool)> {
        if !self.is_expired_at(utils::unix_now()) {
            return Ok((self.token.access_token.clone(), false));
        }

        let refreshed = spotify::auth::refresh_token(http, cfg, &self.token.refresh_token).await?;
        tracing::debug!("access token refreshed");
        self.token = refreshed;
        Ok((self.token.access_token.clone(), true))
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        let lifetime = self.token.expires_in.saturating_sub(EXPIRY_BUFFER_SECS);
        now >= self.token.obtained_at.saturating_add(lifetime)
    }

    pub fn into_token(self) -> Token {
        self.token
    }
}
