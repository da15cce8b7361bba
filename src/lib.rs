//! shardfetch library
//!
//! Downloads the archives listed in a tab-separated manifest and unpacks
//! them on a bounded worker pool. Backs the `shardfetch` and
//! `shardfetch-split` CLIs.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
