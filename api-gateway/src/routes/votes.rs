use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use agora_common::{Proposal, ProposalId, Vote};
use agora_ledger::{CastVote, GlobalStats, TraitTally};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub agent_id: String,
    #[serde(default)]
    pub selected_traits: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    pub vote: Vote,
    pub agent: Proposal,
    pub remaining_votes: u32,
    pub trait_stats: TraitTally,
}

#[derive(Debug, Serialize)]
pub struct RemainingVotesResponse {
    pub remaining_votes: u32,
}

#[derive(Debug, Serialize)]
pub struct TraitStatsResponse {
    pub trait_stats: TraitTally,
}

pub async fn cast_vote(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CastVoteResponse>), ApiError> {
    let Json(req) = payload?;
    let request = CastVote::new(ProposalId::from(req.agent_id), req.selected_traits);

    let outcome = state.ledger.cast_vote(&user.user_id(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CastVoteResponse {
            vote: outcome.vote,
            agent: outcome.proposal,
            remaining_votes: outcome.remaining_votes,
            trait_stats: outcome.trait_tally,
        }),
    ))
}

pub async fn remaining_votes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<RemainingVotesResponse>, ApiError> {
    let remaining_votes = state.ledger.remaining_votes(&user.user_id()).await?;
    Ok(Json(RemainingVotesResponse { remaining_votes }))
}

pub async fn global_stats(State(state): State<AppState>) -> Result<Json<GlobalStats>, ApiError> {
    Ok(Json(state.ledger.global_stats().await?))
}

pub async fn trait_stats(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<TraitStatsResponse>, ApiError> {
    let trait_stats = state.ledger.trait_tally(&ProposalId::from(agent_id)).await?;
    Ok(Json(TraitStatsResponse { trait_stats }))
}
