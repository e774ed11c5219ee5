//! JSON web-service endpoints.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::JobPosting;
use crate::state::AppState;
use crate::stats::{aggregate, Counts, StatsPolicy};

/// GET /json-dataset
pub async fn handle_json_dataset(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let dataset = state.loader.get_data_list().await?;
    Ok(Json(dataset))
}

/// GET /json-stats
///
/// Position type → number of postings.
pub async fn handle_json_stats(State(state): State<AppState>) -> Result<Json<Counts>, AppError> {
    let dataset = state.loader.get_data_list().await?;
    Ok(Json(aggregate(&dataset, StatsPolicy::ByPositionType).counts))
}
