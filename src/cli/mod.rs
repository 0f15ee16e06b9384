mod context;
mod handlers;
pub mod output;
mod shell;

pub use context::{CliError, CliMode, CommandError, ShellContext};
pub use shell::run_cli;
