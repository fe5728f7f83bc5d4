// src/config.rs
use dotenvy::dotenv;
use std::env;

/// Credentials for the persistence backend. Both values are required; if
/// either is missing the service still starts but rejects every submission
/// with a generic 500 (the response never names the missing variable).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub database_url: String,
    pub database_password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub allowed_domains: Vec<String>,
    backend: Option<BackendConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // .env ファイルを読み込む (存在しなくてもエラーにしない)

        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let allowed_domains = env::var("ALLOWED_DOMAINS")
            .unwrap_or_default()
            .split(',')
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect();

        let backend = match (env::var("DATABASE_URL"), env::var("DATABASE_PASSWORD")) {
            (Ok(database_url), Ok(database_password)) => Some(BackendConfig {
                database_url,
                database_password,
            }),
            _ => None,
        };

        Config {
            server_addr,
            allowed_domains,
            backend,
        }
    }

    pub fn backend(&self) -> Option<&BackendConfig> {
        self.backend.as_ref()
    }
}
