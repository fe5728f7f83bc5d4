// src/service/mod.rs
pub mod consent_service;
