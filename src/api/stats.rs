//! Catalog statistics endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::CatalogStats};

/// Headline catalog counts
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
) -> AppResult<Json<CatalogStats>> {
    let stats = state.services.stats.summary().await?;
    Ok(Json(stats))
}
