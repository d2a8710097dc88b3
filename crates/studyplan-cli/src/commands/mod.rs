pub mod config;
pub mod log;
pub mod plan;
pub mod session;
