//! SeaORM entity definitions.
//!
//! Library items are queried through `db::library` because movies and series
//! share one shape across two tables.

pub mod user;
