// This lib.rs file exposes modules for the binary and for integration tests

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod report;
pub mod scanner;
