// src/main.rs
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod db;
mod domain;
mod error;
mod repository;
mod service;
mod utils;

use crate::api::handlers::consent_handler::consent_router;
use crate::api::AppState;
use crate::config::Config;
use crate::db::create_db_pool;
use crate::utils::allowlist::DomainAllowlist;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // トレーシングの設定
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consent_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Starting Consent Backend server...");

    // 設定を読み込む
    let app_config = Config::from_env();

    let allowlist = DomainAllowlist::new(&app_config.allowed_domains);
    if allowlist.is_empty() {
        tracing::warn!("ALLOWED_DOMAINS is empty; every submission will be rejected");
    }

    // バックエンドの資格情報が欠けていてもプロセスは起動し、
    // 受け付けたリクエストには汎用の 500 を返す
    let db_pool = match app_config.backend() {
        Some(backend) => match create_db_pool(backend).await {
            Ok(pool) => {
                tracing::info!("Database pool created successfully.");
                Some(pool)
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to create database pool");
                None
            }
        },
        None => {
            tracing::warn!("Backend storage is not configured");
            None
        }
    };

    let app_state = AppState::new(db_pool, allowlist);

    // ルーターの設定
    let app_router = consent_router(app_state);

    // サーバーの起動
    tracing::info!(
        "Router configured. Server listening on {}",
        app_config.server_addr
    );

    let listener = TcpListener::bind(&app_config.server_addr).await?;
    axum::serve(listener, app_router.into_make_service()).await?;

    Ok(())
}
