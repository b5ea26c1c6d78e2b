//! Book copy (instance) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        instance::{BookInstance, CreateBookInstance, LoanDetails, UpdateBookInstance},
        PageQuery,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List all copies (staff overview, due date order)
#[utoipa::path(
    get,
    path = "/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "List of copies", body = PaginatedLoanList),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_instances(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require_staff()?;

    let (items, total) = state.services.catalog.list_instances(&query).await?;
    let (page, per_page) = query.resolve(state.config.catalog.page_size);

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// Get copy details by ID
#[utoipa::path(
    get,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = LoanDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LoanDetails>> {
    claims.require_staff()?;

    let instance = state.services.catalog.get_instance(id).await?;
    Ok(Json(instance))
}

/// Register a new copy of a book
#[utoipa::path(
    post,
    path = "/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(instance): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    claims.require_staff()?;

    let created = state.services.catalog.create_instance(instance).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a copy
#[utoipa::path(
    put,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    claims.require_staff()?;

    let updated = state.services.catalog.update_instance(id, update).await?;
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct DeleteInstanceParams {
    pub force: Option<bool>,
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID"),
        ("force" = Option<bool>, Query, description = "Force delete even if the copy is on loan")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy is on loan")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteInstanceParams>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state
        .services
        .catalog
        .delete_instance(id, params.force.unwrap_or(false))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
