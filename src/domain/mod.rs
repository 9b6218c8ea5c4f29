pub mod appointment;
pub mod date_range;
pub mod filter;
pub mod query;
pub mod schedule;

pub use appointment::*;
pub use date_range::*;
pub use filter::*;
pub use query::*;
pub use schedule::*;
