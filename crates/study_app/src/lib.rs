pub mod cli;
pub mod commands;
pub mod config;

pub use crate::commands::run;
pub use crate::config::AppConfig;
