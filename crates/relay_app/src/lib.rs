//! Relay server: configuration, HTTP intake and the user allow-list.
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod users;
