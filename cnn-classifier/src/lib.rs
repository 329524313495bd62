pub mod cli;
pub mod scaffold;

pub use cli::{run, Cli, Commands};
