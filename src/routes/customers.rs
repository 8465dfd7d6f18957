use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::customers::{CustomerList, ImportResult},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Customer,
    response::ApiResponse,
    routes::{csv_attachment, params::SearchQuery},
    services::customer_service,
    state::AppState,
};

pub const IMPORT_BODY_LIMIT: usize = 5 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers))
        .route("/export", get(export_customers))
        .route(
            "/import",
            post(import_customers).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route("/{id}", get(get_customer))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    params(SearchQuery),
    responses(
        (status = 200, description = "Customers", body = ApiResponse<CustomerList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = customer_service::list_customers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = ApiResponse<Customer>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_customer(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customers/import",
    request_body(
        content_type = "multipart/form-data",
        description = "Form field `file` holding sips_pelanggan_YYYYMMDD_HHMM.csv"
    ),
    responses(
        (status = 200, description = "Import summary", body = ApiResponse<ImportResult>),
        (status = 400, description = "Bad filename or invalid rows; nothing imported"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn import_customers(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ImportResult>>> {
    ensure_staff(&user)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| AppError::BadRequest("Uploaded file has no filename".into()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("Missing multipart field 'file'".into()))?;
    let resp = customer_service::import_customers(&state, &user, &filename, &data).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/export",
    responses(
        (status = 200, description = "All customers as sips_pelanggan CSV", content_type = "text/csv", body = String),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn export_customers(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<axum::response::Response> {
    let (filename, body) = customer_service::export_customers(&state, &user).await?;
    Ok(csv_attachment(&filename, body))
}
