use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use agora_ledger::ActivityView;

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on a caller-supplied feed size
const MAX_ACTIVITY_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

pub async fn recent_activities(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<ActivityView>>, ApiError> {
    let limit = query.limit.map(|l| l.min(MAX_ACTIVITY_LIMIT));
    Ok(Json(state.ledger.recent_activity(limit).await?))
}
