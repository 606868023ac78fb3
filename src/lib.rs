//! Media Collector Library
//!
//! Classifies movie, show and music video names, matches them against TMDB,
//! writes Kodi-compatible NFO files and artwork, and files finished items into
//! their storage roots.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
