// src/utils/mod.rs
pub mod allowlist;
pub mod origin;
pub mod payload_hash;
