//! LogicVision command-line driver.

pub mod config;

pub use config::{resolve_log_level, resolve_mode};
