//! Core business logic modules.

pub mod classifier;
pub mod context;
pub mod episodes;
pub mod matcher;
pub mod migrator;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod processor;
pub mod scanner;
pub mod sidecar;
pub mod watcher;
