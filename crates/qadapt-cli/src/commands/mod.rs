//! CLI command implementations.

pub mod common;
pub mod exact;
pub mod models;
pub mod pool;
pub mod run;
pub mod version;
