// src/domain/mod.rs
pub mod consent_event_model;
