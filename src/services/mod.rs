//! Long-running services.

pub mod worker;
