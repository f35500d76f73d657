pub mod cli;
pub mod load_config;
pub mod logging;
pub mod source;
pub mod target;

pub use cli::{run, Cli, Commands};
