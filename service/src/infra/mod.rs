//! Infrastructure layer.

pub mod database;

pub use self::database::Database;
#[cfg(feature = "sqlite")]
pub use self::database::{sqlite, Sqlite};
