use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};

use crate::{
    dto::memberships::{
        CreateMembershipRequest, DiscountInfo, MembershipList, TierInfo,
        UpdateMembershipStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Membership,
    response::ApiResponse,
    routes::params::MembershipListQuery,
    services::membership_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_memberships).post(create_membership))
        .route("/tiers", get(list_tiers))
        .route("/discount", get(my_discount))
        .route("/{id}", get(get_membership).delete(delete_membership))
        .route("/{id}/status", patch(update_membership_status))
}

#[utoipa::path(
    get,
    path = "/api/memberships/tiers",
    responses((status = 200, description = "Tier catalogue", body = ApiResponse<Vec<TierInfo>>)),
    tag = "Memberships"
)]
pub async fn list_tiers() -> Json<ApiResponse<Vec<TierInfo>>> {
    Json(membership_service::tiers())
}

#[utoipa::path(
    get,
    path = "/api/memberships/discount",
    responses(
        (status = 200, description = "Discount the caller's next booking receives", body = ApiResponse<DiscountInfo>),
        (status = 403, description = "Customers only")
    ),
    security(("bearer_auth" = [])),
    tag = "Memberships"
)]
pub async fn my_discount(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DiscountInfo>>> {
    let resp = membership_service::my_discount(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/memberships",
    params(MembershipListQuery),
    responses((status = 200, description = "Memberships visible to the caller", body = ApiResponse<MembershipList>)),
    security(("bearer_auth" = [])),
    tag = "Memberships"
)]
pub async fn list_memberships(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MembershipListQuery>,
) -> AppResult<Json<ApiResponse<MembershipList>>> {
    let resp = membership_service::list_memberships(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/memberships",
    request_body = CreateMembershipRequest,
    responses(
        (status = 200, description = "Membership created", body = ApiResponse<Membership>),
        (status = 409, description = "Customer already has an active membership")
    ),
    security(("bearer_auth" = [])),
    tag = "Memberships"
)]
pub async fn create_membership(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateMembershipRequest>,
) -> AppResult<Json<ApiResponse<Membership>>> {
    let resp = membership_service::create_membership(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/memberships/{id}",
    params(("id" = String, Path, description = "Membership ID")),
    responses(
        (status = 200, description = "Membership", body = ApiResponse<Membership>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Memberships"
)]
pub async fn get_membership(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Membership>>> {
    let resp = membership_service::get_membership(&state, &user, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/memberships/{id}/status",
    params(("id" = String, Path, description = "Membership ID")),
    request_body = UpdateMembershipStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Membership>),
        (status = 409, description = "Another membership is already active")
    ),
    security(("bearer_auth" = [])),
    tag = "Memberships"
)]
pub async fn update_membership_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMembershipStatusRequest>,
) -> AppResult<Json<ApiResponse<Membership>>> {
    let resp = membership_service::update_membership_status(&state, &user, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/memberships/{id}",
    params(("id" = String, Path, description = "Membership ID")),
    responses((status = 200, description = "Membership removed"), (status = 404, description = "Not Found")),
    security(("bearer_auth" = [])),
    tag = "Memberships"
)]
pub async fn delete_membership(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = membership_service::delete_membership(&state, &user, &id).await?;
    Ok(Json(resp))
}
