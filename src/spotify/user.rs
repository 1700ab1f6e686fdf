use serde_json::Value;

use crate::{Res, spotify::SpotifyClient, types::UserProfile};

pub const SEARCH_LIMIT: u32 = 10;

impl SpotifyClient {
    /// `GET /me`, returned as the raw profile object.
    pub async fn current_user(&self) -> Res<Value> {
        self.get_json("me", &[]).await
    }

    pub async fn current_user_id(&self) -> Res<String> {
        let profile: UserProfile = self.get_json("me", &[]).await?;
        Ok(profile.id)
    }

    /// `GET /search` with a fixed limit of [`SEARCH_LIMIT`] results.
    pub async fn search(&self, query: &str, kind: &str) -> Res<Value> {
        self.get_json(
            "search",
            &[
                ("q", query.to_string()),
                ("type", kind.to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ],
        )
        .await
    }
}
