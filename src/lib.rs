pub mod calculator;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod server;
pub mod services;
