use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::stock::{AdjustStockRequest, CreateStockRequest, StockList, UpdateStockRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::StockItem,
    response::ApiResponse,
    routes::params::{LowStockQuery, SearchQuery},
    services::stock_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock).post(create_stock))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/{id}",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
        .route("/{id}/adjust", patch(adjust_stock))
}

#[utoipa::path(
    get,
    path = "/api/stock",
    params(SearchQuery),
    responses(
        (status = 200, description = "Stock items", body = ApiResponse<StockList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn list_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<StockList>>> {
    let resp = stock_service::list_stock(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stock/low-stock",
    params(LowStockQuery),
    responses((status = 200, description = "Items at or below the threshold", body = ApiResponse<StockList>)),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<StockList>>> {
    let resp = stock_service::list_low_stock(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/stock",
    request_body = CreateStockRequest,
    responses(
        (status = 200, description = "Stock item created", body = ApiResponse<StockItem>),
        (status = 409, description = "Name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn create_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateStockRequest>,
) -> AppResult<Json<ApiResponse<StockItem>>> {
    let resp = stock_service::create_stock(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stock/{id}",
    params(("id" = Uuid, Path, description = "Stock ID")),
    responses(
        (status = 200, description = "Stock item", body = ApiResponse<StockItem>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn get_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StockItem>>> {
    let resp = stock_service::get_stock(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/stock/{id}",
    params(("id" = Uuid, Path, description = "Stock ID")),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock item updated", body = ApiResponse<StockItem>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn update_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockRequest>,
) -> AppResult<Json<ApiResponse<StockItem>>> {
    let resp = stock_service::update_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/stock/{id}",
    params(("id" = Uuid, Path, description = "Stock ID")),
    responses((status = 200, description = "Stock item removed"), (status = 404, description = "Not Found")),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn delete_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = stock_service::delete_stock(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/stock/{id}/adjust",
    params(("id" = Uuid, Path, description = "Stock ID")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Quantity adjusted", body = ApiResponse<StockItem>),
        (status = 400, description = "Zero delta or negative result"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> AppResult<Json<ApiResponse<StockItem>>> {
    let resp = stock_service::adjust_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
