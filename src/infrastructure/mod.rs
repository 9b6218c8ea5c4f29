pub mod duckdb_store;
pub mod hooks;
pub mod plugins;
pub mod repository;

#[cfg(test)]
pub mod test_utils;

pub use duckdb_store::*;
pub use hooks::*;
pub use plugins::*;
pub use repository::*;
