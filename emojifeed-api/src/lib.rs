pub mod config;
pub mod identity;
pub mod server;
pub mod service;
