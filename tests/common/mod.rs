use sanguku_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::pelanggan::ActiveModel as PelangganActive,
    middleware::auth::{AuthUser, Role},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

pub const COURT_RATE: i64 = 60_000;

/// Returns `None` (and the caller skips) when no database is configured.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(database_url).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE booking, membership, password_reset_tokens, audit_logs, stok, pengguna, pelanggan CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-test-secret".into(),
        jwt_ttl_hours: 1,
        court_hourly_rate: COURT_RATE,
        report_cache_ttl_secs: 30,
        membership_sweep_secs: 3600,
        cors_origin: None,
    };
    Ok(AppState::new(pool, orm, config))
}

pub async fn create_customer(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let customer = PelangganActive {
        pelanggan_id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        nama: Set(format!("Pelanggan {username}")),
        email: Set(None),
        no_telepon: Set(None),
        password_hash: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: customer.pelanggan_id,
        username: customer.username,
        role: Role::Customer,
    })
}

pub fn staff_user(role: Role) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        username: format!("{role}-flow"),
        role,
    }
}
