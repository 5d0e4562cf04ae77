//! Database module for SQLite persistence.

mod books;
mod pool;

pub use books::*;
pub use pool::*;
