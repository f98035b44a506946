use std::io::Write;

use console::Style;

/// Print a Cargo-style status line: `    Resolved 12 elements`
///
/// The `label` is right-aligned to 12 characters and printed in bold green.
pub fn status(label: &str, message: &str) {
    write_status(Style::new().green().bold(), label, message);
}

/// Like [`status`] but bold cyan, for informational lines.
pub fn status_info(label: &str, message: &str) {
    write_status(Style::new().cyan().bold(), label, message);
}

/// Bold yellow label, for unresolved elements and other soft failures.
pub fn status_warn(label: &str, message: &str) {
    write_status(Style::new().yellow().bold(), label, message);
}

fn write_status(style: Style, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{:>12} {message}", style.apply_to(label));
}
