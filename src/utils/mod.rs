//! Shared helpers.

pub mod chinese;
pub mod fs;
pub mod tokenizer;
