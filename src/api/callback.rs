use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    Res,
    management::{AppState, session},
    spotify, utils,
};

/// Starts the login: stores a fresh PKCE verifier in the browser's session
/// and redirects to the Spotify consent screen.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Res<Response> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let auth_url = spotify::auth::authorize_url(&state.config.spotify, &code_challenge)?;

    let known = match session::session_id_from_headers(&headers) {
        Some(id) => state.sessions.contains(&id).await.then_some(id),
        None => None,
    };
    let session_id = match known {
        Some(id) => id,
        None => state.sessions.create().await,
    };
    state
        .sessions
        .update(&session_id, |s| s.pkce_verifier = Some(code_verifier))
        .await;

    Ok((
        [(header::SET_COOKIE, session::session_cookie(&session_id))],
        Redirect::to(&auth_url),
    )
        .into_response())
}

/// Completes the login with the authorization code sent back by Spotify.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(error) = params.get("error") {
        tracing::warn!(error = %error, "authorization denied");
        return (StatusCode::BAD_REQUEST, Html("<h4>Login was cancelled.</h4>")).into_response();
    }

    let Some(code) = params.get("code") else {
        return (StatusCode::BAD_REQUEST, "No code provided").into_response();
    };

    let verifier = match session::session_id_from_headers(&headers) {
        Some(id) => state
            .sessions
            .get(&id)
            .await
            .and_then(|s| s.pkce_verifier)
            .map(|verifier| (id, verifier)),
        None => None,
    };
    let Some((session_id, verifier)) = verifier else {
        return (
            StatusCode::BAD_REQUEST,
            Html("<h4>Missing PKCE code verifier.</h4>"),
        )
            .into_response();
    };

    match spotify::auth::exchange_code_pkce(&state.http, &state.config.spotify, code, &verifier)
        .await
    {
        Ok(token) => {
            state
                .sessions
                .update(&session_id, |s| {
                    s.pkce_verifier = None;
                    s.token = Some(token);
                    s.user_id = None;
                })
                .await;
            tracing::info!("login completed");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "token exchange failed");
            (StatusCode::BAD_GATEWAY, Html("<h4>Login failed.</h4>")).into_response()
        }
    }
}

/// Forgets the browser's session.
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(id) = session::session_id_from_headers(&headers) {
        state.sessions.remove(&id).await;
    }

    (
        [(header::SET_COOKIE, session::expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
