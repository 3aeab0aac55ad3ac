use crate::db;
use crate::domain::{
    self, Poll, PollDraft, PollOption, StatusFilter, normalized_expiry, validate,
};
use crate::error::PollError;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Json, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct ListPollsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub option_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub message: String,
    pub poll: Poll,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub poll_id: Uuid,
    pub question: String,
    pub total_votes: i64,
    pub winner: Option<PollOption>,
    pub breakdown: Vec<ResultRow>,
}

#[derive(Debug, Serialize)]
pub struct ResultRow {
    pub id: Uuid,
    pub text: String,
    pub vote_count: i64,
    pub percentage: f64,
    pub rank: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_polls: usize,
    pub active_polls: usize,
    pub total_votes: i64,
}

// Repeat-vote markers are keyed by an opaque client-chosen token; absent
// token means the vote is accepted without deduplication.
fn voter_key_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-voter-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// List polls, optionally narrowed by a search term and a status facet.
pub async fn list_polls(
    Extension(app_state): Extension<AppState>,
    Query(query): Query<ListPollsQuery>,
) -> Result<impl IntoResponse, PollError> {
    let polls = db::load_all_polls(&app_state.db).await?;

    let search = query.search.as_deref().unwrap_or("");
    let status = query.status.unwrap_or_default();
    let filtered: Vec<Poll> = domain::filter_polls(&polls, search, status, Utc::now())
        .into_iter()
        .cloned()
        .collect();

    Ok((StatusCode::OK, Json(filtered)))
}

/// Get a single poll with its options and current tallies.
pub async fn get_poll(
    Extension(app_state): Extension<AppState>,
    Path(poll_id): Path<Uuid>,
) -> Result<impl IntoResponse, PollError> {
    let poll = db::load_poll(&app_state.db, poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    Ok((StatusCode::OK, Json(poll)))
}

/// Create a new poll from a submitted draft.
pub async fn create_poll(
    Extension(app_state): Extension<AppState>,
    Json(draft): Json<PollDraft>,
) -> Result<impl IntoResponse, PollError> {
    let errors = validate(&draft, Utc::now());
    if !errors.is_empty() {
        return Err(PollError::ValidationFailed(errors));
    }

    // Validation guarantees the expiry parses; blank means no expiry.
    let expires_at: Option<DateTime<Utc>> = normalized_expiry(&draft)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|expiry| expiry.with_timezone(&Utc));

    let option_texts = domain::clean_options(&draft.options);
    let poll_id = db::create_poll(
        &app_state.db,
        draft.question.trim(),
        draft.description.trim(),
        &option_texts,
        expires_at,
    )
    .await?;

    let poll = db::load_poll(&app_state.db, poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    info!("created poll {poll_id}");
    Ok((StatusCode::CREATED, Json(poll)))
}

/// Cast a single-choice vote and return the poll with updated tallies. The
/// client replaces its local copy with this response rather than counting
/// votes itself.
pub async fn vote_on_poll(
    Extension(app_state): Extension<AppState>,
    Path(poll_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CastVoteRequest>,
) -> Result<impl IntoResponse, PollError> {
    let poll = db::load_poll(&app_state.db, poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    if !poll.is_open(Utc::now()) {
        return Err(PollError::PollClosed);
    }

    let option_belongs = poll.options.iter().any(|opt| opt.id == payload.option_id);
    if !option_belongs {
        return Err(PollError::OptionNotFound);
    }

    let voter_key = voter_key_from_headers(&headers);
    match db::cast_vote(&app_state.db, poll_id, payload.option_id, voter_key.as_deref()).await {
        Ok(()) => {}
        Err(sqlx::Error::RowNotFound) => return Err(PollError::AlreadyVoted),
        Err(e) => return Err(e.into()),
    }

    let poll = db::load_poll(&app_state.db, poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    info!("recorded vote on poll {poll_id}");
    let response = VoteResponse {
        message: "Vote recorded successfully".to_string(),
        poll,
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Display-ready results: ranked breakdown, percentages and the leader.
pub async fn get_results(
    Extension(app_state): Extension<AppState>,
    Path(poll_id): Path<Uuid>,
) -> Result<impl IntoResponse, PollError> {
    let poll = db::load_poll(&app_state.db, poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    let breakdown = domain::ranked_options(&poll)
        .into_iter()
        .enumerate()
        .map(|(index, opt)| ResultRow {
            percentage: domain::percentage_of(&opt, &poll),
            rank: index + 1,
            id: opt.id,
            text: opt.text,
            vote_count: opt.vote_count,
        })
        .collect();

    let response = ResultsResponse {
        poll_id: poll.id,
        question: poll.question.clone(),
        total_votes: poll.total_votes,
        winner: domain::winner(&poll).cloned(),
        breakdown,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Whether the calling voter already has a marker on this poll. Without a
/// voter token the answer is always false.
pub async fn check_vote(
    Extension(app_state): Extension<AppState>,
    Path(poll_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, PollError> {
    db::get_poll_row(&app_state.db, poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    let has_voted = match voter_key_from_headers(&headers) {
        Some(key) => db::voter_has_voted(&app_state.db, poll_id, &key).await?,
        None => false,
    };

    Ok((StatusCode::OK, Json(json!({ "has_voted": has_voted }))))
}

/// Close a poll so its derived status becomes `inactive`.
pub async fn close_poll(
    Extension(app_state): Extension<AppState>,
    Path(poll_id): Path<Uuid>,
) -> Result<impl IntoResponse, PollError> {
    db::get_poll_row(&app_state.db, poll_id)
        .await?
        .ok_or(PollError::PollNotFound)?;

    db::close_poll(&app_state.db, poll_id).await?;

    info!("closed poll {poll_id}");
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Poll closed successfully"
        })),
    ))
}

/// Collection-level aggregates for the landing page.
pub async fn stats(
    Extension(app_state): Extension<AppState>,
) -> Result<impl IntoResponse, PollError> {
    let polls = db::load_all_polls(&app_state.db).await?;

    let response = StatsResponse {
        total_polls: polls.len(),
        active_polls: domain::count_active(&polls, Utc::now()),
        total_votes: domain::sum_votes(&polls),
    };

    Ok((StatusCode::OK, Json(response)))
}
