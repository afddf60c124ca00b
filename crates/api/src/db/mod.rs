//! Shared database schema, migrations, and query builders.

pub mod admin_settings;
pub mod bot_settings;
pub mod migrations;
pub mod sessions;
pub mod tables;

// Re-export tables for convenience
pub use tables::*;

/// A built statement: SQL text plus bound values.
pub type Built = (String, sea_query::Values);
