//! vidscript store: SQLite persistence for sessions, product info and scripts.

pub mod schema;
pub mod sqlite;

pub use sqlite::ScriptStore;
