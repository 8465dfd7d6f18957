use axum::{
    Json, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};

use crate::{
    dto::auth::{
        LoginRequest, LoginResponse, MeResponse, PasswordResetConfirmRequest,
        PasswordResetRequest, PasswordResetTokenResponse, RegisterRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, TOKEN_COOKIE},
    models::Customer,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/password-reset", post(create_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
}

pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{TOKEN_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}")
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register customer", body = ApiResponse<Customer>),
        (status = 400, description = "Username taken or invalid input")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = auth_service::register_customer(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login; also sets the HTTP-only token cookie", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let resp = auth_service::login(&state, payload).await?;
    let token = resp
        .data
        .as_ref()
        .map(|d| d.token.clone())
        .unwrap_or_default();
    let cookie = session_cookie(&token, state.config.jwt_ttl_hours * 3600);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Clears the token cookie")),
    tag = "Auth"
)]
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, session_cookie("", 0))]),
        Json(ApiResponse::success(
            "Logged out",
            serde_json::json!({}),
            None,
        )),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current identity", body = ApiResponse<MeResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(user: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(auth_service::me(&user))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Issue a one-time reset token (owner only)", body = ApiResponse<PasswordResetTokenResponse>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown username")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn create_password_reset(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PasswordResetRequest>,
) -> AppResult<Json<ApiResponse<PasswordResetTokenResponse>>> {
    let resp = auth_service::create_reset_token(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid, used or expired token")
    ),
    tag = "Auth"
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::confirm_reset(&state, payload).await?;
    Ok(Json(resp))
}
