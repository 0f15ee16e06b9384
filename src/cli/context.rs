//! Shell state, command table, dispatch, and error reporting.

use std::io;

use strsim::levenshtein;

use crate::core::services::ServiceError;
use crate::core::utils::PathResolver;
use crate::core::{TripManager, TripSession};
use crate::errors::LedgerError;

use super::handlers;
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub(crate) type CommandResult = Result<LoopControl, CommandError>;

/// Failures that stop the shell itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<LedgerError> for CliError {
    fn from(err: LedgerError) -> Self {
        CliError::Service(err.into())
    }
}

/// Failures of a single command; reported and the shell carries on.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No trip is open. Use `open <trip> [participants...]` first.")]
    NoTripOpen,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<LedgerError> for CommandError {
    fn from(err: LedgerError) -> Self {
        CommandError::Service(err.into())
    }
}

pub(crate) struct CommandEntry {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub handler: fn(&mut ShellContext, &[&str]) -> CommandResult,
}

pub(crate) const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "open",
        usage: "open <trip> [participants...] [--password <password>]",
        description: "Open a trip, creating it when new",
        handler: handlers::open,
    },
    CommandEntry {
        name: "close",
        usage: "close",
        description: "Close the current trip",
        handler: handlers::close,
    },
    CommandEntry {
        name: "trips",
        usage: "trips",
        description: "List saved trips",
        handler: handlers::trips,
    },
    CommandEntry {
        name: "participants",
        usage: "participants [names...]",
        description: "Show or add participants of the current trip",
        handler: handlers::participants,
    },
    CommandEntry {
        name: "expense",
        usage: "expense <date> <payer> <amount> [--desc <text>] [--split A,B] [--id <id>]",
        description: "Record an expense, or replace one with --id",
        handler: handlers::expense,
    },
    CommandEntry {
        name: "expenses",
        usage: "expenses",
        description: "List the expenses of the current trip",
        handler: handlers::expenses,
    },
    CommandEntry {
        name: "remove-expense",
        usage: "remove-expense <id>",
        description: "Delete an expense",
        handler: handlers::remove_expense,
    },
    CommandEntry {
        name: "group",
        usage: "group <name> <members...>",
        description: "Create or replace a group of participants",
        handler: handlers::group,
    },
    CommandEntry {
        name: "ungroup",
        usage: "ungroup <name>",
        description: "Remove a group",
        handler: handlers::ungroup,
    },
    CommandEntry {
        name: "lock",
        usage: "lock",
        description: "Make the current trip read-only",
        handler: handlers::lock,
    },
    CommandEntry {
        name: "unlock",
        usage: "unlock",
        description: "Allow edits to the current trip again",
        handler: handlers::unlock,
    },
    CommandEntry {
        name: "summary",
        usage: "summary [--share]",
        description: "Show balances and settlements",
        handler: handlers::summary,
    },
    CommandEntry {
        name: "export",
        usage: "export <file>",
        description: "Write the current trip to a JSON file",
        handler: handlers::export,
    },
    CommandEntry {
        name: "import",
        usage: "import <file> [--password <password>]",
        description: "Add a trip from an exported JSON file and open it",
        handler: handlers::import,
    },
    CommandEntry {
        name: "delete-trip",
        usage: "delete-trip <trip>",
        description: "Delete a trip and its settings",
        handler: handlers::delete_trip,
    },
    CommandEntry {
        name: "version",
        usage: "version",
        description: "Show build information",
        handler: handlers::version,
    },
    CommandEntry {
        name: "help",
        usage: "help [command]",
        description: "List commands or show usage",
        handler: handlers::help,
    },
    CommandEntry {
        name: "exit",
        usage: "exit",
        description: "Leave the shell",
        handler: handlers::exit,
    },
];

pub(crate) fn find_command(name: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|entry| entry.name == name)
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) manager: TripManager,
    pub(crate) session: Option<TripSession>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = TripManager::with_base_dir(PathResolver::base_dir())?;
        Ok(Self::with_manager(mode, manager))
    }

    pub fn with_manager(mode: CliMode, manager: TripManager) -> Self {
        Self {
            mode,
            manager,
            session: None,
            running: true,
        }
    }

    pub(crate) fn session(&self) -> Result<&TripSession, CommandError> {
        self.session.as_ref().ok_or(CommandError::NoTripOpen)
    }

    pub(crate) fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("trip({})> ", session.display_name()),
            None => "trip> ".to_string(),
        }
    }

    pub(crate) fn dispatch(&mut self, command: &str, args: &[&str]) -> CommandResult {
        let command = if command == "quit" { "exit" } else { command };
        match find_command(command) {
            Some(entry) => (entry.handler)(self, args),
            None => {
                self.suggest_command(command);
                Ok(LoopControl::Continue)
            }
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let best = COMMANDS
            .iter()
            .map(|entry| (levenshtein(entry.name, input), entry.name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        tracing::debug!(error = %err, "command failed");
        match err {
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }
}
