use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::{CustomerDashboard, OwnerDashboard, StaffDashboard},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/owner", get(owner))
        .route("/staff", get(staff))
        .route("/customer", get(customer))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/owner",
    responses(
        (status = 200, description = "Owner aggregates", body = ApiResponse<OwnerDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn owner(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OwnerDashboard>>> {
    Ok(Json(dashboard_service::owner_dashboard(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/staff",
    responses(
        (status = 200, description = "Staff aggregates", body = ApiResponse<StaffDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn staff(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<StaffDashboard>>> {
    Ok(Json(dashboard_service::staff_dashboard(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/customer",
    responses(
        (status = 200, description = "Customer overview", body = ApiResponse<CustomerDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn customer(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CustomerDashboard>>> {
    Ok(Json(dashboard_service::customer_dashboard(&state, &user).await?))
}
