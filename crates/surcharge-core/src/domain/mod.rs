//! Domain entities - the core business objects.

mod call_log;

pub use call_log::CallLog;
