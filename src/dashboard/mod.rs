use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::board::{HealthStatus, LiveBoard};
use crate::live_scores::sports;
use crate::models::Match;
use crate::notify::format_match;

#[derive(Clone)]
pub struct AppState {
    pub board: LiveBoard,
}

/// Build the Axum router for the read-only match surface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/matches", get(matches_handler))
        .route("/matches/:sport_id", get(sport_matches_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Serialize)]
struct MatchesResponse<T> {
    matches: T,
    last_update: Option<DateTime<Utc>>,
}

/// GET /matches
async fn matches_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (matches, last_update) = state.board.matches().await;
    Json(MatchesResponse {
        matches,
        last_update,
    })
}

/// GET /matches/:sport_id
async fn sport_matches_handler(
    State(state): State<Arc<AppState>>,
    Path(sport_id): Path<u32>,
) -> impl IntoResponse {
    let (matches, last_update) = state.board.matches_for(sport_id).await;
    Json(MatchesResponse {
        matches,
        last_update,
    })
}

/// GET /health: 503 once the poller is degraded.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.board.health().await;
    let code = match health.status {
        HealthStatus::Ok => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(health))
}

/// GET /: auto-refreshing page with the latest match blocks.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (matches, last_update) = state.board.matches().await;
    HtmlTemplate(IndexTemplate {
        sections: sections(&matches),
        last_update: last_update
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "waiting for first update".to_string()),
    })
}

struct SportSection {
    emoji: &'static str,
    name: &'static str,
    blocks: Vec<String>,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    sections: Vec<SportSection>,
    last_update: String,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Registry order first, then any sport outside the registry.
fn sections(matches: &BTreeMap<u32, Vec<Match>>) -> Vec<SportSection> {
    let known = sports::SPORTS
        .iter()
        .map(|s| s.id)
        .filter(|id| matches.contains_key(id));
    let unknown = matches
        .keys()
        .copied()
        .filter(|id| sports::lookup(*id).is_none());

    known
        .chain(unknown)
        .filter_map(|sport_id| {
            let sport_matches = matches.get(&sport_id)?;
            Some(SportSection {
                emoji: sports::emoji_for(sport_id),
                name: sports::name_for(sport_id),
                blocks: sport_matches
                    .iter()
                    .map(|m| {
                        format_match(m, &sports::derive_period(m, sport_id))
                            .trim_end()
                            .to_string()
                    })
                    .collect(),
            })
        })
        .collect()
}
