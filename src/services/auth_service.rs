use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{
        Claims, LoginRequest, LoginResponse, MeResponse, PasswordResetConfirmRequest,
        PasswordResetRequest, PasswordResetTokenResponse, RegisterRequest,
    },
    entity::{
        password_reset_tokens::{ActiveModel as ResetActive, Entity as ResetTokens},
        pelanggan::{self, ActiveModel as PelangganActive, Entity as Pelanggan},
        pengguna::{self, ActiveModel as PenggunaActive, Entity as Pengguna},
        role::Entity as Roles,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Role, ensure_owner},
    models::Customer,
    response::{ApiResponse, Meta},
    state::AppState,
};

const RESET_TOKEN_TTL_MINUTES: i64 = 60;
const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn issue_token(user: &AuthUser, secret: &str, ttl_hours: i64) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.user_id.to_string(),
        username: user.username.clone(),
        role: user.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

async fn username_taken(state: &AppState, username: &str) -> AppResult<bool> {
    let staff = Pengguna::find()
        .filter(pengguna::Column::Username.eq(username))
        .one(&state.orm)
        .await?;
    if staff.is_some() {
        return Ok(true);
    }
    let customer = Pelanggan::find()
        .filter(pelanggan::Column::Username.eq(username))
        .one(&state.orm)
        .await?;
    Ok(customer.is_some())
}

pub async fn register_customer(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Customer>> {
    let RegisterRequest {
        username,
        nama,
        password,
        email,
        no_telepon,
    } = payload;
    let username = username.trim().to_string();
    if username.is_empty() || nama.trim().is_empty() {
        return Err(AppError::BadRequest("username and nama are required".into()));
    }
    validate_password(&password)?;

    if username_taken(state, &username).await? {
        return Err(AppError::BadRequest("Username is already taken".to_string()));
    }

    let customer = PelangganActive {
        pelanggan_id: Set(Uuid::new_v4()),
        username: Set(username),
        nama: Set(nama.trim().to_string()),
        email: Set(email.filter(|e| !e.trim().is_empty())),
        no_telepon: Set(no_telepon.filter(|p| !p.trim().is_empty())),
        password_hash: Set(Some(hash_password(&password)?)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| match AppError::from(err) {
        // Lost a race with a concurrent registration of the same name.
        AppError::Conflict(_) => AppError::BadRequest("Username is already taken".to_string()),
        other => other,
    })?;

    audit::record(
        &state.pool,
        customer.pelanggan_id,
        "customer_register",
        "pelanggan",
        serde_json::json!({ "username": customer.username }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer registered",
        Customer::from(customer),
        None,
    ))
}

/// Looks up `pengguna` first so staff accounts shadow customers with the
/// same username.
pub async fn authenticate(state: &AppState, payload: &LoginRequest) -> AppResult<AuthUser> {
    let invalid = || AppError::Unauthorized("Invalid username or password".into());

    let staff = Pengguna::find()
        .filter(pengguna::Column::Username.eq(payload.username.trim()))
        .find_also_related(Roles)
        .one(&state.orm)
        .await?;

    if let Some((user, role)) = staff {
        if !verify_password(&payload.password, &user.password_hash)? {
            return Err(invalid());
        }
        let role = role
            .and_then(|r| Role::from_role_table(&r.nama_role))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Unknown role for user")))?;
        return Ok(AuthUser {
            user_id: user.pengguna_id,
            username: user.username,
            role,
        });
    }

    let customer = Pelanggan::find()
        .filter(pelanggan::Column::Username.eq(payload.username.trim()))
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;
    let hash = customer.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&payload.password, hash)? {
        return Err(invalid());
    }

    Ok(AuthUser {
        user_id: customer.pelanggan_id,
        username: customer.username,
        role: Role::Customer,
    })
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = authenticate(state, &payload).await?;
    let token = issue_token(&user, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;

    tracing::info!(username = %user.username, role = %user.role, "user logged in");
    audit::record(
        &state.pool,
        user.user_id,
        "user_login",
        user.role.as_str(),
        serde_json::json!({ "username": user.username }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token,
            username: user.username,
            role: user.role,
        },
        Some(Meta::empty()),
    ))
}

pub fn me(user: &AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::success(
        "Current user",
        MeResponse {
            id: user.user_id,
            username: user.username.clone(),
            role: user.role,
        },
        None,
    )
}

pub async fn create_reset_token(
    state: &AppState,
    user: &AuthUser,
    payload: PasswordResetRequest,
) -> AppResult<ApiResponse<PasswordResetTokenResponse>> {
    ensure_owner(user)?;
    let username = payload.username.trim();

    let (pengguna_id, pelanggan_id) = match Pengguna::find()
        .filter(pengguna::Column::Username.eq(username))
        .one(&state.orm)
        .await?
    {
        Some(staff) => (Some(staff.pengguna_id), None),
        None => {
            let customer = Pelanggan::find()
                .filter(pelanggan::Column::Username.eq(username))
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            (None, Some(customer.pelanggan_id))
        }
    };

    let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    let token = ResetActive {
        token: Set(Uuid::new_v4().simple().to_string()),
        pengguna_id: Set(pengguna_id),
        pelanggan_id: Set(pelanggan_id),
        expires_at: Set(expires_at.into()),
        used_at: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "password_reset_issued",
        "password_reset_tokens",
        serde_json::json!({ "username": username }),
    )
    .await;

    Ok(ApiResponse::success(
        "Reset token created",
        PasswordResetTokenResponse {
            token: token.token,
            expires_at,
        },
        None,
    ))
}

pub async fn confirm_reset(
    state: &AppState,
    payload: PasswordResetConfirmRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_password(&payload.new_password)?;
    let password_hash = hash_password(&payload.new_password)?;
    let txn = state.orm.begin().await?;

    // Row lock makes concurrent confirmations of one token serialize; the
    // losers see `used_at` set.
    let token = ResetTokens::find_by_id(payload.token.trim().to_string())
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid reset token".into()))?;
    if token.used_at.is_some() {
        return Err(AppError::BadRequest("Reset token already used".into()));
    }
    if token.expires_at.with_timezone(&Utc) < Utc::now() {
        return Err(AppError::BadRequest("Reset token expired".into()));
    }

    if let Some(id) = token.pengguna_id {
        let staff = Pengguna::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;
        let mut active: PenggunaActive = staff.into();
        active.password_hash = Set(password_hash);
        active.update(&txn).await?;
    } else if let Some(id) = token.pelanggan_id {
        let customer = Pelanggan::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;
        let mut active: PelangganActive = customer.into();
        active.password_hash = Set(Some(password_hash));
        active.update(&txn).await?;
    } else {
        return Err(AppError::BadRequest("Invalid reset token".into()));
    }

    let mut used: ResetActive = token.into();
    used.used_at = Set(Some(Utc::now().into()));
    used.update(&txn).await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Password updated",
        serde_json::json!({ "reset": true }),
        None,
    ))
}
