use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppError, Res, api, management::AppState};

/// Assembles every route with CORS for the configured frontend origin.
pub fn router(state: Arc<AppState>) -> Res<Router> {
    let origin = HeaderValue::from_str(&state.config.frontend_origin).map_err(|e| {
        AppError::Config(format!("FRONTEND_ORIGIN is not a valid header value: {e}"))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/api/me", get(api::me))
        .route("/api/search", get(api::search))
        .route("/api/create_playlist", post(api::create_playlist))
        .route("/api/add_tracks", post(api::add_tracks))
        .route("/api/remove_tracks", post(api::remove_tracks))
        .route("/api/update_playlist", post(api::update_playlist))
        .route("/api/playlists", get(api::playlists))
        .route("/api/playlist/{playlist_id}", get(api::playlist_info))
        .route("/api/playlist/{playlist_id}/rename", post(api::rename_playlist))
        .route("/api/liked_tracks", get(api::liked_tracks))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

pub async fn bind(addr: &str) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| AppError::Config(format!("invalid server address {addr}: {e}")))?;
    Ok(TcpListener::bind(addr).await?)
}

pub async fn start_api_server(listener: TcpListener, state: Arc<AppState>) -> Res<()> {
    let app = router(state)?;
    tracing::info!(addr = ?listener.local_addr().ok(), "serving");
    axum::serve(listener, app).await?;
    Ok(())
}
