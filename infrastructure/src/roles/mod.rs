//! Role catalog adapters

mod catalog;

pub use catalog::StaticRoleCatalog;
