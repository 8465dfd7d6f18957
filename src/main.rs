use std::{net::SocketAddr, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sanguku_api::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, create_pool, run_migrations},
    routes::build_app,
    services::{membership_service, today},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sanguku_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;

    run_migrations(&orm).await?;

    spawn_membership_sweep(orm.clone(), config.membership_sweep_secs);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let state = AppState::new(pool, orm, config);
    let app = build_app(state);

    tracing::info!("listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

/// Flips lapsed active memberships to expired. The first tick fires immediately.
fn spawn_membership_sweep(orm: OrmConn, every_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(every_secs.max(1)));
        loop {
            interval.tick().await;
            match membership_service::expire_memberships(&orm, today()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(expired = n, "membership sweep"),
                Err(err) => tracing::warn!(error = %err, "membership sweep failed"),
            }
        }
    });
}
