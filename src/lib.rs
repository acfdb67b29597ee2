pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod logging;
pub mod models;
pub mod output;
pub mod service;
