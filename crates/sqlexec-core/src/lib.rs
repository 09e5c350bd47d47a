pub mod config;
pub mod logging;

pub mod bound;
pub mod control;
pub mod cursor;
pub mod execute;
pub mod handle;
pub mod retry;
