//! Application state shared by every handler

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::config::Config;
use crate::db::DbService;
use crate::notify::Notifier;
use crate::services::images::ImageStore;

#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub jwt: JwtService,
    /// Outbox for best-effort mail
    pub notifier: Notifier,
    /// Product image files
    pub images: ImageStore,
}

impl AppState {
    pub fn new(config: Config, db: DbService, notifier: Notifier) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_days);
        let images = ImageStore::new(config.product_upload_dir());
        Self {
            pool: db.pool,
            config: Arc::new(config),
            jwt,
            notifier,
            images,
        }
    }
}
