pub mod auth;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod templates_structs;
