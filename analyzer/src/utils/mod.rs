pub mod config;
pub mod file_operations;
pub mod logging;
