pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extraction;
pub mod fingerprint;
pub mod language;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod retrieve;
pub mod search;
pub mod server;
pub mod stance;
pub mod tasks;
pub mod types;
pub mod veracity;
