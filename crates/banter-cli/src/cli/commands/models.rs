//! `models` subcommand: list the supported model tags.

use banter_core::config::Config;
use banter_core::session::ModelId;

pub fn run(config: &Config) {
    for model in ModelId::ALL {
        let marker = if model.tag() == config.model { "*" } else { " " };
        println!("{} {:<12} {}", marker, model.tag(), model.description());
    }
}
