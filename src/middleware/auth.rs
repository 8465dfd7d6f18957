use std::fmt;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Staff,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Staff => "staff",
            Role::Customer => "customer",
        }
    }

    /// Parses a `role.nama_role` value; customers never come from that table.
    pub fn from_role_table(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "owner" => Some(Role::Owner),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity extracted from a valid JWT. For customers `user_id` is the
/// `pelanggan_id`; for owner/staff it is the `pengguna_id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }
}

pub fn ensure_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if !allowed.contains(&user.role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_owner(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Owner])
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Owner, Role::Staff])
}

/// Bearer header wins over the cookie when both are present.
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let auth_str = value
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;
        return Ok(token.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing authentication token".into()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        username: decoded.claims.username,
        role: decoded.claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)?;
        decode_token(&token, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token_for(role: Role, secret: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "rina".into(),
            role,
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn reads_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn reads_token_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=xyz; lang=id"),
        );
        assert_eq!(extract_token(&headers).unwrap(), "xyz");
    }

    #[test]
    fn rejects_missing_or_foreign_scheme() {
        assert!(matches!(
            extract_token(&HeaderMap::new()),
            Err(AppError::Unauthorized(_))
        ));
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert!(matches!(extract_token(&headers), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn decodes_valid_token_and_rejects_bad_ones() {
        let user = decode_token(&token_for(Role::Staff, "s3cret", 3600), "s3cret").unwrap();
        assert_eq!(user.role, Role::Staff);
        assert_eq!(user.username, "rina");

        assert!(decode_token(&token_for(Role::Staff, "other", 3600), "s3cret").is_err());
        assert!(decode_token(&token_for(Role::Owner, "s3cret", -3600), "s3cret").is_err());
    }

    #[test]
    fn role_guards() {
        let customer = AuthUser {
            user_id: Uuid::new_v4(),
            username: "budi".into(),
            role: Role::Customer,
        };
        assert!(matches!(ensure_staff(&customer), Err(AppError::Forbidden)));
        let staff = AuthUser {
            role: Role::Staff,
            ..customer.clone()
        };
        assert!(ensure_staff(&staff).is_ok());
        assert!(ensure_owner(&staff).is_err());
        assert_eq!(Role::from_role_table("Owner"), Some(Role::Owner));
        assert_eq!(Role::from_role_table("customer"), None);
    }
}
