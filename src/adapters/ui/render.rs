//! Coloured terminal rendering of reports.

use crate::domain::Report;
use crossterm::ExecutableCommand;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{Write, stdout};

/// Plain-text body of a report: description, then `Name: value` lines.
pub fn plain_lines(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(desc) = &report.description {
        lines.extend(desc.replace("**", "").lines().map(String::from));
        lines.push(String::new());
    }
    for field in &report.fields {
        if field.value.contains('\n') {
            lines.push(format!("{}:", field.name));
            lines.extend(field.value.lines().map(|l| format!("  {}", l)));
        } else {
            lines.push(format!("{}: {}", field.name, field.value));
        }
    }
    lines
}

/// Print `report` with its accent colour on the title bar.
pub fn print_report(report: &Report) {
    let mut out = stdout();
    let (r, g, b) = report.accent.rgb();
    let _ = out.execute(Print("\r\n"));
    let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
    let _ = out.execute(SetAttribute(Attribute::Bold));
    let _ = out.execute(Print(format!("▌ {}\r\n", report.title)));
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);

    for line in plain_lines(report) {
        let _ = out.execute(Print(format!("  {}\r\n", line)));
    }

    let _ = out.execute(SetForegroundColor(Color::DarkGrey));
    let _ = out.execute(Print(format!("  {}\r\n", report.footer)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Accent;

    #[test]
    fn lines_strip_markup_and_indent_multiline_fields() {
        let report = Report::new("T", Accent::Green)
            .description("**alice**\n- Rank in 1: Owner (255)")
            .field("Friends", "3", true)
            .field("Groups", "A\nB", false);
        assert_eq!(
            plain_lines(&report),
            vec![
                "alice",
                "- Rank in 1: Owner (255)",
                "",
                "Friends: 3",
                "Groups:",
                "  A",
                "  B",
            ]
        );
    }
}
