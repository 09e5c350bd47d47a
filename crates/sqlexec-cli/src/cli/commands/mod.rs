//! CLI command handlers. Each command is in its own file.

mod backoff;
mod completions;
mod config;
mod explain;
mod simulate;

pub use backoff::run_backoff;
pub use completions::{run_completions, run_man};
pub use config::run_config;
pub use explain::{run_explain, ExplainArgs};
pub use simulate::run_simulate;
