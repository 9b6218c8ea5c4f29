pub mod change_log;
pub mod console_notify;

pub use change_log::*;
pub use console_notify::*;
