pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod store;
pub mod utils;
