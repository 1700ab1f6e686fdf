use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::{
    AppError,
    management::{AppState, session},
};

/// A request whose session holds a token.
///
/// Extraction only looks at the session store; the token is refreshed later,
/// by [`Authorized::client`], so handlers can validate their input before any
/// remote call happens.
pub struct Authorized {
    pub state: Arc<AppState>,
    pub session_id: String,
}

impl Authorized {
    pub async fn client(&self) -> crate::Res<crate::spotify::SpotifyClient> {
        self.state.spotify_client(&self.session_id).await
    }
}

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<Arc<AppState>>()
            .cloned()
            .ok_or_else(|| AppError::Config("application state is not installed".to_string()))?;

        let session_id =
            session::session_id_from_headers(&parts.headers).ok_or(AppError::Unauthenticated)?;

        let authenticated = state
            .sessions
            .get(&session_id)
            .await
            .is_some_and(|s| s.token.is_some());
        if !authenticated {
            return Err(AppError::Unauthenticated);
        }

        Ok(Self { state, session_id })
    }
}

/// JSON request body whose rejections answer `400 {"error": ...}`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string counterpart of [`JsonBody`].
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
