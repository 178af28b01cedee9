pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod query;
pub mod resource;
pub mod schema;
pub mod server;
pub mod types;

#[cfg(test)]
pub mod testing;
