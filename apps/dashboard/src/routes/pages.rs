//! HTML views and the chart image.

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};
use tracing::debug;

use crate::errors::AppError;
use crate::figure;
use crate::state::AppState;
use crate::stats::{aggregate, StatsPolicy};
use crate::views;

/// Records shown on the `/data` page.
pub const DATA_PAGE_ROWS: usize = 15;

/// GET /
pub async fn handle_home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let dataset = state.loader.get_data_list().await?;
    let tally = aggregate(&dataset, StatsPolicy::ByPositionType);
    Ok(Html(views::home(&tally.sorted_desc())))
}

/// GET /image
///
/// Top skills as an SVG bar chart. Drawing runs on the blocking pool.
pub async fn handle_image(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let dataset = state.loader.get_data_list().await?;
    let tally = aggregate(&dataset, StatsPolicy::BySkill);
    debug!(
        "Skill statistics: {} skills, {} mentions, {} postings skipped",
        tally.counts.len(),
        tally.total(),
        tally.skipped.len()
    );

    let svg = tokio::task::spawn_blocking(move || figure::render(&tally.counts, "Skills"))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// GET /data
///
/// First rows of the dataset with descriptions cut for display.
/// The cached postings are never modified.
pub async fn handle_data(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let dataset = state.loader.get_data_list().await?;
    let rows: Vec<_> = dataset
        .iter()
        .take(DATA_PAGE_ROWS)
        .map(|job| job.display_copy())
        .collect();
    Ok(Html(views::data(&rows)))
}

/// GET /about
pub async fn handle_about() -> Html<String> {
    Html(views::about())
}
