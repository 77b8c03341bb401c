pub mod app;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
pub mod users;
pub mod validation;
