// Expense Client - Library root

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod resources;
pub mod state;

#[cfg(test)]
mod test_support;
