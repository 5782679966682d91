//! Access levels and the catalog that ranks them.

mod access_level;
mod catalog;

pub use self::access_level::{AccessLevel, StandardLevel};
pub use self::catalog::AccessLevelCatalog;
