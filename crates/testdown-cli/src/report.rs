//! Text rendering of a run's [`Report`].

use serde::Serialize;
use std::fmt::Write;
use testdown::{Outcome, Report, Tally};

const INDENT: &str = "    ";

/// Renders every scope below `report` as a `--- PASS|FAIL|SKIP: name` line.
///
/// Failure messages are always included; logs only for failed scopes unless
/// `verbose` is set.
pub fn render(report: &Report, verbose: bool) -> String {
    let mut out = String::new();
    for child in &report.children {
        render_scope(&mut out, child, 0, verbose);
    }

    let tally = report.tally();
    let status = if report.failed() { "FAIL" } else { "ok" };
    let _ = writeln!(
        out,
        "{status}: {} passed, {} failed, {} skipped",
        tally.passed, tally.failed, tally.skipped
    );
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    tally: Tally,
    #[serde(flatten)]
    report: &'a Report,
}

/// Renders the report tree and its tally as pretty-printed JSON.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        tally: report.tally(),
        report,
    })
}

fn render_scope(out: &mut String, report: &Report, depth: usize, verbose: bool) {
    let indent = INDENT.repeat(depth);
    let _ = writeln!(out, "{indent}--- {}: {}", report.outcome, report.name);

    if verbose || report.outcome == Outcome::Failed {
        for log in &report.logs {
            write_block(out, &indent, log);
        }
    }
    for failure in &report.failures {
        write_block(out, &indent, failure);
    }

    for child in &report.children {
        render_scope(out, child, depth + 1, verbose);
    }
}

fn write_block(out: &mut String, indent: &str, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "{indent}{INDENT}{line}");
    }
}
