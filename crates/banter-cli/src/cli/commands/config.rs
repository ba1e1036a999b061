//! `config` subcommands.

use anyhow::Result;
use banter_core::config::{Config, paths};

pub fn path() {
    println!("{}", paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = paths::config_path();
    Config::init(&config_path)?;
    println!("Created {}", config_path.display());
    Ok(())
}
