// src/lib.rs
// Mock backend for the ProjectLearn Manager UI: an in-memory store served as a JSON API
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;
