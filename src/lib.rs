pub mod client;
pub mod config;
pub mod constants;
pub mod filter;
pub mod gifts;
pub mod groups;
pub mod history;
pub mod manager;
pub mod models;
pub mod orders;
pub mod proxy;
pub mod users;
pub mod utils;
