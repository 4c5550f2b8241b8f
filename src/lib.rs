pub mod config;
pub mod handlers;
pub mod integrations;
pub mod models;
pub mod outbox;
pub mod routes;
pub mod state;
pub mod utils;
