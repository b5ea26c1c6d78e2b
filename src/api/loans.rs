//! Loan list and renewal endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{instance::LoanDetails, PageQuery},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Renewal request; a missing date defaults to the proposed renewal date
#[derive(Deserialize, ToSchema)]
pub struct RenewRequest {
    pub due_back: Option<NaiveDate>,
}

/// Proposed renewal date for the prefilled form
#[derive(Serialize, ToSchema)]
pub struct RenewProposal {
    pub due_back: NaiveDate,
}

/// Copies on loan to the calling user, due date ascending
#[utoipa::path(
    get,
    path = "/loans/my",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "The caller's active loans", body = PaginatedLoanList),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (items, total) = state
        .services
        .loans
        .user_loans(claims.user_id, &query)
        .await?;
    let (page, per_page) = query.resolve(state.config.catalog.page_size);

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// All copies on loan to anyone, due date ascending
#[utoipa::path(
    get,
    path = "/loans/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All active loans", body = PaginatedLoanList),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require_staff()?;

    let (items, total) = state.services.loans.all_borrowed(&query).await?;
    let (page, per_page) = query.resolve(state.config.catalog.page_size);

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// Proposed default renewal date for a copy
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Proposed renewal date", body = RenewProposal),
        (status = 403, description = "Loan management permission required"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_proposal(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewProposal>> {
    claims.require_mark_returned()?;

    // 404 for unknown copies even on the proposal endpoint
    state.services.catalog.get_instance(id).await?;

    Ok(Json(RenewProposal {
        due_back: state.services.loans.proposed_renewal_date(),
    }))
}

/// Renew a loan: set a new due date on an on-loan copy
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Loan renewed", body = LoanDetails),
        (status = 400, description = "Invalid renewal date"),
        (status = 403, description = "Loan management permission required"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy is not on loan")
    )
)]
pub async fn renew_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewRequest>,
) -> AppResult<Json<LoanDetails>> {
    claims.require_mark_returned()?;

    let renewed = state.services.loans.renew(id, request.due_back).await?;
    Ok(Json(renewed))
}
