pub mod api;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod observability;
pub mod state;
pub mod store;
