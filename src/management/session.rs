use std::collections::HashMap;

use axum::http::{HeaderMap, header};
use tokio::sync::RwLock;

use crate::{types::Token, utils};

pub const SESSION_COOKIE: &str = "playlist_bridge_session";

/// Server-side state of one browser session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// PKCE verifier of a login that has not completed yet.
    pub pkce_verifier: Option<String>,
    pub token: Option<Token>,
    /// Spotify user id, resolved on first use and kept for cache lookups.
    pub user_id: Option<String>,
}

/// Volatile session store, keyed by the id carried in [`SESSION_COOKIE`].
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session and returns its id.
    pub async fn create(&self) -> String {
        let id = utils::generate_session_id();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Session::default());
        id
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Applies `f` to the session; `false` if it does not exist.
    pub async fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        match self.sessions.write().await.get_mut(id) {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: &str) -> Option<Session> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Extracts the session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the browser to session `id`.
pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that makes the browser forget its session.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
