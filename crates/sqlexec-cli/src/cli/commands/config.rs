//! `sqlexec config` – show where the config lives and what is in effect.

use anyhow::Result;
use sqlexec_core::config::{self, ClientConfig};
use std::path::Path;

pub fn run_config(cfg: &ClientConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);

    let policy = cfg.retry_policy();
    println!();
    println!("# effective retry policy (after hard limits)");
    println!("# max_attempts = {}", policy.max_attempts);
    println!("# max_duration = {:?}", policy.max_duration);
    println!(
        "# delay = [{:?}, {:?}], base {:?}, jitter {}",
        policy.delay_min, policy.delay_max, policy.delay_default, policy.jitter
    );
    Ok(())
}
