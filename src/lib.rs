//! INI-backed configuration store with per-key change handlers.

pub mod config;
pub mod fs_utils;
pub mod logging;
