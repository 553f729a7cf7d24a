//! An in-process [`Scope`] implementation that records a report tree.
//!
//! Child scopes run synchronously in the order they are started; scopes that
//! declare [`Scope::parallel`] are flagged in the report but not scheduled
//! concurrently.

use super::scope::Scope;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Passed => "PASS",
            Outcome::Failed => "FAIL",
            Outcome::Skipped => "SKIP",
        })
    }
}

/// The recorded result of a scope and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub name: String,
    pub outcome: Outcome,
    pub parallel: bool,
    pub logs: Vec<String>,
    pub failures: Vec<String>,
    pub children: Vec<Report>,
}

/// Outcome counts over the leaves of a report tree, plus every scope that
/// reported a failure of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Report {
    pub fn failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }

    pub fn child(&self, name: &str) -> Option<&Report> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Counts the outcomes of scopes that have no children.
    ///
    /// A scope with children that also reported failures itself (such as a
    /// document with dangling assertions) counts as one more failure.
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        self.tally_into(&mut tally);
        tally
    }

    fn tally_into(&self, tally: &mut Tally) {
        if !self.children.is_empty() {
            if !self.failures.is_empty() {
                tally.failed += 1;
            }
            for child in &self.children {
                child.tally_into(tally);
            }
            return;
        }

        match self.outcome {
            Outcome::Passed => tally.passed += 1,
            Outcome::Failed => tally.failed += 1,
            Outcome::Skipped => tally.skipped += 1,
        }
    }
}

/// Records scopes into a [`Report`].
#[derive(Debug)]
pub struct Recorder {
    path: String,
    report: Report,
    finished: bool,
}

impl Recorder {
    /// Creates the top-level scope.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            report: Report {
                name,
                outcome: Outcome::Passed,
                parallel: false,
                logs: Vec::new(),
                failures: Vec::new(),
                children: Vec::new(),
            },
            finished: false,
        }
    }

    /// The slash-separated names of this scope and its ancestors.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn finish(self) -> Report {
        self.report
    }

    fn child(&self, name: &str) -> Self {
        let mut child = Self::new(name);
        child.path = format!("{}/{name}", self.path);
        child
    }

    fn is_finished(&self, what: &str) -> bool {
        if self.finished {
            log::warn!("{}: ignoring {what} on a finished scope", self.path);
        }
        self.finished
    }

    fn fail(&mut self, message: String) {
        log::debug!("{}: {message}", self.path);
        self.report.outcome = Outcome::Failed;
        self.report.failures.push(message);
    }
}

impl Scope for Recorder {
    fn parallel(&mut self) {
        self.report.parallel = true;
    }

    fn run<F>(&mut self, name: &str, f: F) -> bool
    where
        F: FnOnce(&mut Self),
    {
        if self.is_finished("child scope") {
            return false;
        }

        let mut child = self.child(name);
        log::trace!("=== RUN {}", child.path);
        f(&mut child);

        let report = child.finish();
        log::trace!("--- {}: {}/{name}", report.outcome, self.path);

        let passed = !report.failed();
        if !passed {
            self.report.outcome = Outcome::Failed;
        }
        self.report.children.push(report);
        passed
    }

    fn log(&mut self, message: fmt::Arguments<'_>) {
        if self.is_finished("log") {
            return;
        }
        let message = message.to_string();
        log::trace!("{}: {message}", self.path);
        self.report.logs.push(message);
    }

    fn error(&mut self, message: fmt::Arguments<'_>) {
        if self.is_finished("error") {
            return;
        }
        self.fail(message.to_string());
    }

    fn fatal(&mut self, message: fmt::Arguments<'_>) {
        if self.is_finished("fatal") {
            return;
        }
        self.fail(message.to_string());
        self.finished = true;
    }

    fn skip_now(&mut self) {
        if self.is_finished("skip") {
            return;
        }
        // A scope that already failed stays failed.
        if !self.report.failed() {
            self.report.outcome = Outcome::Skipped;
        }
        self.finished = true;
    }
}
