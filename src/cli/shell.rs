use std::io::{self, BufRead, Write};

use shell_words::split;

use crate::cli::context::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;

/// Runs the shell.
///
/// Arguments, when given, form a single command line. Otherwise lines are
/// read from stdin; `TRIP_CORE_CLI_SCRIPT` suppresses the prompt.
pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = if !args.is_empty() || std::env::var_os("TRIP_CORE_CLI_SCRIPT").is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    if args.is_empty() {
        run_lines(&mut context, io::stdin().lock())
    } else {
        let line = shell_words::join(&args);
        if let Err(err) = handle_line(&mut context, &line) {
            context.report_error(err);
        }
        Ok(())
    }
}

pub(crate) fn run_lines(context: &mut ShellContext, input: impl BufRead) -> Result<(), CliError> {
    let mut lines = input.lines();
    while context.running {
        if context.mode == CliMode::Interactive {
            print!("{}", context.prompt());
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            if context.mode == CliMode::Interactive {
                output::info("Exiting shell.");
            }
            break;
        };
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err),
        }
    }
    Ok(())
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if raw.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    tracing::debug!(%command, args = args.len(), "dispatching command");

    match context.dispatch(&command, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TripManager;
    use tempfile::tempdir;

    fn script_context(base: &std::path::Path) -> ShellContext {
        let manager = TripManager::with_base_dir(base.to_path_buf()).unwrap();
        ShellContext::with_manager(CliMode::Script, manager)
    }

    #[test]
    fn script_lines_drive_the_manager() {
        let dir = tempdir().unwrap();
        let mut context = script_context(dir.path());
        let script = "open \"Goa 2025\" A B C\nexpense 2025-01-10 A 300 --desc Dinner\nexit\nlock\n";

        run_lines(&mut context, script.as_bytes()).unwrap();

        let session = context.session.clone().expect("trip open");
        assert_eq!(session.trip(), "Goa_2025");
        let summary = context.manager.summary(&session).unwrap();
        assert_eq!(summary.settlements.len(), 2);
        assert!(!summary.locked, "commands after exit must not run");
    }

    #[test]
    fn failing_commands_do_not_stop_the_script() {
        let dir = tempdir().unwrap();
        let mut context = script_context(dir.path());
        let script = "expense 2025-01-10 A 300\nopen Trip A B\nexpense nope A 1\nexpense 2025-01-10 A 10\n";

        run_lines(&mut context, script.as_bytes()).unwrap();

        let session = context.session.clone().unwrap();
        assert_eq!(context.manager.ledger(&session).unwrap().records.len(), 1);
    }

    #[test]
    fn unknown_commands_and_comments_continue() {
        let dir = tempdir().unwrap();
        let mut context = script_context(dir.path());
        assert_eq!(
            handle_line(&mut context, "sumary").unwrap(),
            LoopControl::Continue
        );
        assert_eq!(
            handle_line(&mut context, "# a comment").unwrap(),
            LoopControl::Continue
        );
        assert_eq!(handle_line(&mut context, "quit").unwrap(), LoopControl::Exit);
        assert!(!context.running);
    }
}
