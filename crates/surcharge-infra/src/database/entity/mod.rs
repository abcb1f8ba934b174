//! SeaORM entities.

pub mod call_log;
