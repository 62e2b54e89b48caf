use axum::extract::{Path, State};
use axum::Json;

use agora_common::{Proposal, ProposalId};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_agents(State(state): State<AppState>) -> Result<Json<Vec<Proposal>>, ApiError> {
    Ok(Json(state.ledger.list_proposals().await?))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Proposal>, ApiError> {
    let proposal = state.ledger.get_proposal(&ProposalId::from(id)).await?;
    Ok(Json(proposal))
}
