pub mod config;
pub mod download;
pub mod extract;
pub mod manifest;
pub mod pool;
pub mod report;
