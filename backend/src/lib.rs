pub mod auth;
pub mod axum_http;
pub mod background;
pub mod config;
pub mod usecases;
