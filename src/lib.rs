// src/lib.rs
pub mod api;
pub mod banner;
pub mod chart;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod poller;
pub mod render;
pub mod table;
