use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
    Plain,
}

fn label(kind: MessageKind) -> Option<(&'static str, &'static str)> {
    match kind {
        MessageKind::Info => Some(("INFO", "[i]")),
        MessageKind::Success => Some(("SUCCESS", "[✓]")),
        MessageKind::Warning => Some(("WARNING", "[!]")),
        MessageKind::Error => Some(("ERROR", "[x]")),
        MessageKind::Section | MessageKind::Plain => None,
    }
}

pub(crate) fn format_message(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let base = match (kind, label(kind)) {
        (MessageKind::Section, _) => format!("=== {} ===", text.trim()),
        (_, Some((label, icon))) => format!("{label}: {icon} {text}"),
        (_, None) => text,
    };

    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info | MessageKind::Plain => base,
    }
}

/// Warnings and errors go to stderr, everything else to stdout.
pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = format_message(kind, message);
    match kind {
        MessageKind::Warning | MessageKind::Error => eprintln!("{formatted}"),
        MessageKind::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

pub fn line(message: impl fmt::Display) {
    print(MessageKind::Plain, message);
}

/// Signed amount with two decimals, e.g. `+200.00` or `-100.00`.
pub fn signed_amount(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_prefix_messages() {
        colored::control::set_override(false);
        assert_eq!(
            format_message(MessageKind::Success, "Trip opened"),
            "SUCCESS: [✓] Trip opened"
        );
        assert_eq!(format_message(MessageKind::Section, " Balances "), "=== Balances ===");
        assert_eq!(format_message(MessageKind::Plain, "B pays A"), "B pays A");
    }

    #[test]
    fn signed_amount_marks_creditors() {
        assert_eq!(signed_amount(200.0), "+200.00");
        assert_eq!(signed_amount(-100.0), "-100.00");
        assert_eq!(signed_amount(0.0), "0.00");
    }
}
