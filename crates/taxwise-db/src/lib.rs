//! PostgreSQL persistence for taxwise plans and suggestions.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
