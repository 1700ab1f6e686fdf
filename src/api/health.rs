use std::sync::Arc;

use axum::{Extension, response::Json};
use serde::Serialize;

use crate::management::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    /// Browser sessions currently held in memory.
    pub sessions: usize,
    /// Identities with a liked-tracks snapshot.
    pub liked_snapshots: usize,
}

pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.sessions.len().await,
        liked_snapshots: state.liked_cache.len().await,
    })
}
