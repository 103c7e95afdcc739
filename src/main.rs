use crate::cli::run;

mod card;
pub mod cli;
mod clip;
mod config;
mod document;
pub mod domain;
mod error;
mod layout;
mod library;
mod pipeline;
mod process;
mod stats;
mod svg;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}
