use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::RevenueReport,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{csv_attachment, params::DateRangeQuery},
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/revenue", get(revenue))
        .route("/revenue.csv", get(revenue_csv))
}

#[utoipa::path(
    get,
    path = "/api/reports/revenue",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Revenue grouped by date and payment method", body = ApiResponse<RevenueReport>),
        (status = 400, description = "Invalid range"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn revenue(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<RevenueReport>>> {
    let resp = report_service::revenue_report(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/revenue.csv",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Revenue report as CSV attachment", content_type = "text/csv", body = String),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn revenue_csv(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<axum::response::Response> {
    let (filename, body) = report_service::revenue_report_csv(&state, &user, query).await?;
    Ok(csv_attachment(&filename, body))
}
