pub mod config;
pub mod handlers;
pub mod models;
