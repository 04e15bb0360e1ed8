pub mod clients;
pub mod config;
pub mod controller;
pub mod history;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod sqlite;
