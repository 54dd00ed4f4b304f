// src/services/mod.rs
pub mod analytics;
