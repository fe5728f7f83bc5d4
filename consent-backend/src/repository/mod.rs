// src/repository/mod.rs
pub mod consent_event_repository;
