//! Database access for GPAi
//!
//! SQLite via sqlx. Schema creation is idempotent; every service opens
//! the same database file under the root folder.

mod init;

pub use init::{init_database, init_memory_database};
