use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::Response,
};
use cardvault_core::{AuditRecord, Card, DeleteOutcome, looks_like_digest};
use cardvault_storage::format_timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Cap on `limit` for a single listing page
const MAX_PAGE: usize = 1_000;

#[derive(Serialize)]
pub struct CardSummary {
    pub digest: String,
    pub size: usize,
    pub claimed_at: String,
    /// `"duplicate"` or `"collision"` for audit cards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<&'static str>,
}

impl From<&Card> for CardSummary {
    fn from(card: &Card) -> Self {
        Self {
            digest: card.digest.clone(),
            size: card.size(),
            claimed_at: format_timestamp(&card.claimed_at),
            audit: AuditRecord::from_card(card).map(|r| r.kind()),
        }
    }
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Serialize)]
pub struct LookupResponse {
    pub exists: bool,
    pub algorithm: String,
}

fn parse_digest(digest: &str) -> ServerResult<&str> {
    if looks_like_digest(digest) {
        Ok(digest)
    } else {
        Err(ServerError::BadRequest("Invalid digest".into()))
    }
}

/// POST /cards
/// Store raw body bytes; the digest is computed server-side
pub async fn create_card(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<CardSummary>)> {
    let card = state.engine.create(&body).await?;
    Ok((StatusCode::CREATED, Json(CardSummary::from(&card))))
}

/// GET /cards?limit=&offset=
pub async fn list_cards(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ServerResult<Json<Vec<CardSummary>>> {
    let limit = params.limit.unwrap_or(MAX_PAGE).min(MAX_PAGE);
    let cards = state.engine.list(Some(limit), params.offset).await?;
    Ok(Json(cards.iter().map(CardSummary::from).collect()))
}

/// GET /cards/{digest}
pub async fn get_card(
    State(state): State<AppState>,
    Path(digest): Path<String>,
) -> ServerResult<Response> {
    let digest = parse_digest(&digest)?;

    let card = state
        .engine
        .get(digest)
        .await?
        .ok_or_else(|| ServerError::NotFound("Card not found".into()))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, card.size())
        .header("X-Content-Digest", &card.digest)
        .header("X-Claimed-At", format_timestamp(&card.claimed_at))
        .body(Body::from(card.bytes))
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(response)
}

/// DELETE /cards/{digest}
pub async fn delete_card(
    State(state): State<AppState>,
    Path(digest): Path<String>,
) -> ServerResult<StatusCode> {
    let digest = parse_digest(&digest)?;

    match state.engine.delete(digest).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(ServerError::NotFound("Card not found".into())),
    }
}

/// POST /cards/lookup
/// Advisory: is this body already stored under the current algorithm?
pub async fn lookup_content(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<LookupResponse>> {
    let exists = state.engine.has_digest_for(&body).await?;
    Ok(Json(LookupResponse {
        exists,
        algorithm: state.engine.current_algorithm(),
    }))
}
