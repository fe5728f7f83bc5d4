// src/db.rs
use crate::config::BackendConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use url::Url;

pub type DbPool = DatabaseConnection;

pub async fn create_db_pool(backend: &BackendConfig) -> Result<DbPool, DbErr> {
    // 接続URLと資格情報は別々のシークレットとして渡される
    let mut url = Url::parse(&backend.database_url)
        .map_err(|err| DbErr::Custom(format!("invalid backend url: {}", err)))?;
    url.set_password(Some(&backend.database_password))
        .map_err(|_| DbErr::Custom("backend url cannot carry credentials".to_string()))?;

    let mut opt = ConnectOptions::new(url.to_string());

    // 接続オプションを設定
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8 * 60));

    Database::connect(opt).await
}
