// consent-backend/src/api/handlers/mod.rs
pub mod consent_handler;
