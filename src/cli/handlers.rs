//! Command handlers invoked through the shell's command table.

use std::{collections::HashMap, path::Path};

use chrono::NaiveDate;

use crate::core::services::ExpenseService;
use crate::core::utils::{display_trip_name, normalize_trip_name};
use crate::core::TripSummary;
use crate::domain::{ExpenseDraft, Settlement};
use crate::utils::build_info;

use super::context::{find_command, CommandError, CommandResult, LoopControl, ShellContext, COMMANDS};
use super::output;

const VALUE_FLAGS: &[&str] = &["password", "desc", "split", "id"];
const SWITCH_FLAGS: &[&str] = &["share"];

/// Positional arguments plus `--flag value` / `--switch` options.
struct ParsedArgs<'a> {
    positional: Vec<&'a str>,
    flags: HashMap<&'a str, &'a str>,
}

impl<'a> ParsedArgs<'a> {
    fn parse(args: &[&'a str]) -> Result<Self, CommandError> {
        let mut positional = Vec::new();
        let mut flags = HashMap::new();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(flag) = arg.strip_prefix("--") else {
                positional.push(arg);
                continue;
            };
            if SWITCH_FLAGS.contains(&flag) {
                flags.insert(flag, "");
            } else if VALUE_FLAGS.contains(&flag) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("`--{flag}` needs a value"))
                })?;
                flags.insert(flag, value);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{flag}`"
                )));
            }
        }
        Ok(Self { positional, flags })
    }

    fn flag(&self, name: &str) -> Option<&'a str> {
        self.flags.get(name).copied()
    }

    fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }
}

fn usage_error(command: &str) -> CommandError {
    let usage = find_command(command).map_or(command, |entry| entry.usage);
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    input
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{input}`")))
}

pub(crate) fn open(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args)?;
    let Some((trip, participants)) = parsed.positional.split_first() else {
        return Err(usage_error("open"));
    };
    let session = ctx
        .manager
        .open_trip(trip, parsed.flag("password"), &owned(participants))?;
    let ledger = ctx.manager.ledger(&session)?;
    output::success(format!(
        "Trip `{}` opened with {} participant(s).",
        session.display_name(),
        ledger.participants.len()
    ));
    ctx.session = Some(session);
    Ok(LoopControl::Continue)
}

pub(crate) fn close(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match ctx.session.take() {
        Some(session) => output::info(format!("Closed trip `{}`.", session.display_name())),
        None => output::info("No trip is open."),
    }
    Ok(LoopControl::Continue)
}

pub(crate) fn trips(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let trips = ctx.manager.list_trips()?;
    if trips.is_empty() {
        output::info("No trips saved yet.");
    }
    for trip in trips {
        output::line(display_trip_name(&trip));
    }
    Ok(LoopControl::Continue)
}

pub(crate) fn participants(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = ctx.session()?.clone();
    if !args.is_empty() {
        let added = ctx.manager.add_participants(&session, &owned(args))?;
        output::success(format!("Added {added} participant(s)."));
    }
    for name in ctx.manager.ledger(&session)?.participants {
        output::line(name);
    }
    Ok(LoopControl::Continue)
}

pub(crate) fn expense(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = ctx.session()?.clone();
    let parsed = ParsedArgs::parse(args)?;
    let [date, payer, amount] = parsed.positional.as_slice() else {
        return Err(usage_error("expense"));
    };

    let split_between = match parsed.flag("split") {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        None => ctx.manager.ledger(&session)?.participants,
    };
    let mut draft = ExpenseDraft::new(
        parse_date(date)?,
        parsed.flag("desc").unwrap_or_default(),
        *payer,
        parse_amount(amount)?,
        split_between,
    );
    if let Some(id) = parsed.flag("id") {
        draft = draft.with_id(id);
    }

    let id = ctx.manager.save_expense(&session, draft)?;
    output::success(format!("Expense `{id}` saved."));
    Ok(LoopControl::Continue)
}

pub(crate) fn expenses(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let ledger = ctx.manager.ledger(ctx.session()?)?;
    if ledger.records.is_empty() {
        output::info("No expenses recorded.");
    }
    for record in ExpenseService::list(&ledger) {
        let split: Vec<&str> = record.eligibility.eligible().collect();
        output::line(format!(
            "{}  {}  {:<12} {:>10.2}  paid by {}  split {}",
            record.id,
            record.date,
            record.description,
            record.total_amount,
            record.payer,
            split.join(",")
        ));
    }
    Ok(LoopControl::Continue)
}

pub(crate) fn remove_expense(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage_error("remove-expense"));
    };
    let session = ctx.session()?.clone();
    let removed = ctx.manager.remove_expense(&session, id)?;
    output::success(format!("Removed expense `{}`.", removed.id));
    Ok(LoopControl::Continue)
}

pub(crate) fn group(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((name, members)) = args.split_first() else {
        return Err(usage_error("group"));
    };
    let session = ctx.session()?.clone();
    let replaced = ctx.manager.set_group(&session, name, &owned(members))?;
    let verb = if replaced { "updated" } else { "created" };
    output::success(format!("Group `{name}` {verb}."));
    Ok(LoopControl::Continue)
}

pub(crate) fn ungroup(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage_error("ungroup"));
    };
    let session = ctx.session()?.clone();
    let removed = ctx.manager.remove_group(&session, name)?;
    output::success(format!("Group `{}` removed.", removed.name));
    Ok(LoopControl::Continue)
}

pub(crate) fn lock(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    set_locked(ctx, true)
}

pub(crate) fn unlock(ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    set_locked(ctx, false)
}

fn set_locked(ctx: &mut ShellContext, locked: bool) -> CommandResult {
    let session = ctx.session()?.clone();
    ctx.manager.set_locked(&session, locked)?;
    let state = if locked { "locked" } else { "unlocked" };
    output::success(format!("Trip `{}` {state}.", session.display_name()));
    Ok(LoopControl::Continue)
}

pub(crate) fn summary(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args)?;
    let session = ctx.session()?.clone();
    let summary = ctx.manager.summary(&session)?;
    let symbol = ctx.manager.currency_symbol()?;

    if parsed.has("share") {
        output::line(summary.share_text(&symbol));
    } else {
        render_summary(&summary, &symbol);
    }
    Ok(LoopControl::Continue)
}

fn render_summary(summary: &TripSummary, symbol: &str) {
    let title = display_trip_name(&summary.trip);
    let lock = if summary.locked { " (locked)" } else { "" };
    output::section(format!("Balances: {title}{lock}"));
    for person in &summary.balances.participants {
        output::line(format!(
            "{:<12} paid {symbol}{:>10.2}  share {symbol}{:>10.2}  balance {:>10}",
            person.name,
            person.gross_paid,
            person.share,
            output::signed_amount(person.balance)
        ));
    }
    output::line(format!("Total spent: {symbol}{:.2}", summary.balances.total_amount));

    output::section("Settlements");
    render_settlements(&summary.settlements, symbol);

    output::section("Between pairs");
    render_settlements(&summary.pairwise, symbol);

    if summary.groups.groups.is_empty() {
        return;
    }
    output::section("Groups");
    for group in &summary.groups.groups {
        output::line(format!(
            "{:<12} paid {symbol}{:>10.2}  share {symbol}{:>10.2}  net {:>10}",
            group.name,
            group.total_gross_paid,
            group.total_allocated_share,
            output::signed_amount(group.net_balance)
        ));
    }
    for warning in &summary.groups.warnings {
        output::warning(warning);
    }

    output::section("Group settlements");
    render_settlements(&summary.group_settlements, symbol);

    output::section("Inter-group settlements");
    render_settlements(&summary.inter_group.settlements, symbol);
    for warning in &summary.inter_group.warnings {
        output::warning(warning);
    }
}

fn render_settlements(settlements: &[Settlement], symbol: &str) {
    if settlements.is_empty() {
        output::line("Everyone is settled up.");
    }
    for settlement in settlements {
        output::line(settlement.describe(symbol));
    }
}

pub(crate) fn export(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [file] = args else {
        return Err(usage_error("export"));
    };
    let session = ctx.session()?;
    ctx.manager.export_trip(session, Path::new(file))?;
    output::success(format!(
        "Trip `{}` exported to {file}.",
        session.display_name()
    ));
    Ok(LoopControl::Continue)
}

pub(crate) fn import(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args)?;
    let [file] = parsed.positional.as_slice() else {
        return Err(usage_error("import"));
    };
    let session = ctx
        .manager
        .import_trip(Path::new(file), parsed.flag("password"))?;
    output::success(format!("Trip `{}` imported.", session.display_name()));
    ctx.session = Some(session);
    Ok(LoopControl::Continue)
}

pub(crate) fn delete_trip(ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [trip] = args else {
        return Err(usage_error("delete-trip"));
    };
    if ctx.manager.delete_trip(trip)? {
        if ctx
            .session
            .as_ref()
            .is_some_and(|session| session.trip() == normalize_trip_name(trip))
        {
            ctx.session = None;
        }
        output::success(format!("Trip `{trip}` deleted."));
    } else {
        output::warning(format!("Trip `{trip}` not found."));
    }
    Ok(LoopControl::Continue)
}

pub(crate) fn version(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::line(build_info::current().summary());
    Ok(LoopControl::Continue)
}

pub(crate) fn help(_ctx: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match find_command(name) {
            Some(entry) => {
                output::line(format!("usage: {}", entry.usage));
                output::line(entry.description);
            }
            None => output::warning(format!("No help for `{name}`.")),
        }
        return Ok(LoopControl::Continue);
    }
    output::section("Commands");
    for entry in COMMANDS {
        output::line(format!("{:<16} {}", entry.name, entry.description));
    }
    Ok(LoopControl::Continue)
}

pub(crate) fn exit(_ctx: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Ok(LoopControl::Exit)
}
