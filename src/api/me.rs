use axum::Json;
use serde_json::Value;

use crate::{
    AppError, Res,
    api::{Authorized, QueryParams},
    types::SearchParams,
};

pub async fn me(auth: Authorized) -> Res<Json<Value>> {
    let client = auth.client().await?;
    Ok(Json(client.current_user().await?))
}

/// Catalog search; `type` defaults to `track`.
pub async fn search(
    auth: Authorized,
    QueryParams(params): QueryParams<SearchParams>,
) -> Res<Json<Value>> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::malformed("missing q param"))?;
    let kind = params
        .kind
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| "track".to_string());

    let client = auth.client().await?;
    Ok(Json(client.search(&query, &kind).await?))
}
