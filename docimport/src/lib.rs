pub mod cli;
pub mod load_config;
pub mod load_input;

pub use cli::{run, Cli, Commands};
