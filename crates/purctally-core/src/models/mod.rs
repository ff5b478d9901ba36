//! Data models shared by the stores, the extractor, and the CLI.

pub mod config;
pub mod patterns;
pub mod record;
