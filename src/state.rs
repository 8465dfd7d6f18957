use std::sync::Arc;

use crate::{
    cache::ReportCache,
    config::AppConfig,
    db::{DbPool, OrmConn},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub report_cache: ReportCache,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> Self {
        let report_cache = ReportCache::new(std::time::Duration::from_secs(
            config.report_cache_ttl_secs,
        ));
        Self {
            pool,
            orm,
            config: Arc::new(config),
            report_cache,
        }
    }
}
