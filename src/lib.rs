pub mod app;
pub mod config;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod list;
pub mod models;
pub mod tmdb;
