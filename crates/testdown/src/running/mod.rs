//! Executes test trees within a test framework.
//!
//! The runner opens a named [`Scope`] for every node of the tree. Suites and
//! documents declare themselves eligible to run in parallel with their
//! siblings; the assertions of a document never do, so they always execute in
//! source order and their output reads top to bottom.

pub mod failure;
pub mod recorder;
pub mod scope;

use crate::models::{Assertion, DanglingAssertion, Document, Suite, Test, Visitor};
use failure::{Failure, line_diff};
use scope::Scope;
use serde::{Deserialize, Serialize};

/// Produces the actual output for an assertion.
///
/// The output of assertions in different documents may be requested
/// concurrently if the framework runs documents in parallel; assertions of the
/// same document are never checked concurrently.
pub trait Output {
    fn output(&self, assertion: &Assertion) -> anyhow::Result<String>;
}

impl<F> Output for F
where
    F: Fn(&Assertion) -> anyhow::Result<String>,
{
    fn output(&self, assertion: &Assertion) -> anyhow::Result<String> {
        self(assertion)
    }
}

/// What to do with the dangling assertions recorded on a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Fail the document, still running its assertions.
    #[default]
    Fail,
    /// Log them in the document's scope.
    Log,
    /// Say nothing.
    Ignore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub dangling_assertions: DanglingPolicy,
}

/// Runs testdown tests within any framework that implements [`Scope`].
#[derive(Debug, Clone)]
pub struct Runner<O> {
    output: O,
    options: RunOptions,
}

impl<O: Output> Runner<O> {
    pub fn new(output: O) -> Self {
        Self::with_options(output, RunOptions::default())
    }

    pub fn with_options(output: O, options: RunOptions) -> Self {
        Self { output, options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Performs the assertions within `test`, opening scopes below `scope`.
    pub fn run<S: Scope>(&self, scope: &mut S, test: &Test) {
        scope.helper();
        test.accept(&mut Visit {
            runner: self,
            scope,
        });
    }

    /// Compares the actual output of `assertion` with its expected output,
    /// returning the actual output when they match.
    pub fn check(&self, assertion: &Assertion) -> Result<String, Failure> {
        let output = self.output.output(assertion).map_err(Failure::Output)?;

        if output != assertion.expected_output {
            return Err(Failure::Mismatch {
                language: assertion.output_language.clone(),
                diff: line_diff(&assertion.expected_output, &output),
            });
        }

        Ok(output)
    }

    fn report_dangling<S: Scope>(&self, scope: &mut S, errors: &[DanglingAssertion]) {
        for error in errors {
            match self.options.dangling_assertions {
                DanglingPolicy::Fail => scope.error(format_args!("{error}")),
                DanglingPolicy::Log => scope.log(format_args!("{error}")),
                DanglingPolicy::Ignore => {}
            }
        }
    }
}

/// Visits a single node on behalf of a [`Runner`].
struct Visit<'r, 's, O, S> {
    runner: &'r Runner<O>,
    scope: &'s mut S,
}

impl<O: Output, S: Scope> Visitor for Visit<'_, '_, O, S> {
    type Output = ();

    fn visit_suite(&mut self, suite: &Suite) {
        let runner = self.runner;
        self.scope.helper();
        self.scope.run(&suite.name, |scope| {
            scope.parallel();

            if suite.skip {
                scope.skip_now();
                return;
            }

            for test in &suite.tests {
                runner.run(scope, test);
            }
        });
    }

    fn visit_document(&mut self, document: &Document) {
        let runner = self.runner;
        self.scope.helper();
        self.scope.run(&document.name, |scope| {
            scope.parallel();

            if document.skip {
                scope.skip_now();
                return;
            }

            runner.report_dangling(scope, &document.errors);

            for assertion in &document.assertions {
                Visit { runner, scope: &mut *scope }.visit_assertion(assertion);
            }
        });
    }

    fn visit_assertion(&mut self, assertion: &Assertion) {
        let runner = self.runner;
        self.scope.helper();
        self.scope.run(&assertion.name, |scope| {
            // Never parallel: a document's results must read in source order.
            if assertion.skip {
                scope.skip_now();
                return;
            }

            scope.log(format_args!(
                "--- INPUT ({}) ---\n{}",
                assertion.input_language, assertion.input
            ));

            match runner.check(assertion) {
                Ok(output) => scope.log(format_args!(
                    "--- OUTPUT ({}) ---\n{output}",
                    assertion.output_language
                )),
                Err(failure) => scope.fatal(format_args!("{failure}")),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recorder::{Outcome, Recorder};
    use relative_path::RelativePathBuf;
    use std::cell::RefCell;
    use std::fmt;

    /// Records every call made by the runner, in order.
    #[derive(Default)]
    struct Trace {
        events: RefCell<Vec<String>>,
    }

    struct TraceScope<'t> {
        trace: &'t Trace,
        name: String,
    }

    impl TraceScope<'_> {
        fn push(&self, event: String) {
            self.trace.events.borrow_mut().push(format!("{}: {event}", self.name));
        }
    }

    impl Scope for TraceScope<'_> {
        fn parallel(&mut self) {
            self.push("parallel".to_string());
        }

        fn run<F>(&mut self, name: &str, f: F) -> bool
        where
            F: FnOnce(&mut Self),
        {
            self.push(format!("run {name}"));
            let mut child = TraceScope {
                trace: self.trace,
                name: format!("{}/{name}", self.name),
            };
            f(&mut child);
            true
        }

        fn log(&mut self, message: fmt::Arguments<'_>) {
            let first_line = message.to_string().lines().next().unwrap_or_default().to_string();
            self.push(format!("log {first_line}"));
        }

        fn error(&mut self, message: fmt::Arguments<'_>) {
            self.push(format!("error {message}"));
        }

        fn fatal(&mut self, message: fmt::Arguments<'_>) {
            let first_line = message.to_string().lines().next().unwrap_or_default().to_string();
            self.push(format!("fatal {first_line}"));
        }

        fn skip_now(&mut self) {
            self.push("skip".to_string());
        }
    }

    fn assertion(line: usize, input: &str, expected: &str) -> Assertion {
        Assertion {
            name: format!("L{line}"),
            file: RelativePathBuf::from("d.testdown.md"),
            line,
            skip: false,
            input_language: "text".to_string(),
            input: input.to_string(),
            output_language: "text".to_string(),
            expected_output: expected.to_string(),
        }
    }

    fn document(name: &str, assertions: Vec<Assertion>) -> Document {
        Document {
            name: name.to_string(),
            file: RelativePathBuf::from(name),
            skip: false,
            assertions,
            errors: Vec::new(),
        }
    }

    fn upper(assertion: &Assertion) -> anyhow::Result<String> {
        if assertion.input.starts_with("error") {
            anyhow::bail!("cannot transform {}", assertion.name);
        }
        Ok(assertion.input.to_uppercase())
    }

    #[test]
    fn test_runs_tree_in_order_with_parallel_only_above_assertions() {
        let tree = Test::Suite(Suite {
            name: "root".to_string(),
            dir: RelativePathBuf::from("root"),
            skip: false,
            tests: vec![
                document("a.testdown.md", vec![assertion(2, "x\n", "X\n"), assertion(8, "y\n", "Y\n")])
                    .into(),
            ],
        });

        let trace = Trace::default();
        let mut scope = TraceScope {
            trace: &trace,
            name: "t".to_string(),
        };
        Runner::new(upper).run(&mut scope, &tree);

        assert_eq!(
            trace.events.into_inner(),
            vec![
                "t: run root",
                "t/root: parallel",
                "t/root: run a.testdown.md",
                "t/root/a.testdown.md: parallel",
                "t/root/a.testdown.md: run L2",
                "t/root/a.testdown.md/L2: log --- INPUT (text) ---",
                "t/root/a.testdown.md/L2: log --- OUTPUT (text) ---",
                "t/root/a.testdown.md: run L8",
                "t/root/a.testdown.md/L8: log --- INPUT (text) ---",
                "t/root/a.testdown.md/L8: log --- OUTPUT (text) ---",
            ]
        );
    }

    #[test]
    fn test_failures_are_isolated_per_assertion() {
        let tree = Test::Document(document(
            "d.testdown.md",
            vec![
                assertion(2, "error\n", "ERROR\n"),
                assertion(6, "a\n", "B\n"),
                assertion(10, "c\n", "C\n"),
            ],
        ));

        let mut root = Recorder::new("root");
        Runner::new(upper).run(&mut root, &tree);
        let report = root.finish();

        let document = report.child("d.testdown.md").unwrap();
        assert!(document.failed());

        let errored = document.child("L2").unwrap();
        assert_eq!(errored.outcome, Outcome::Failed);
        assert_eq!(
            errored.failures,
            vec!["--- OUTPUT (error) ---\ncannot transform L2"]
        );

        let mismatched = document.child("L6").unwrap();
        assert_eq!(mismatched.outcome, Outcome::Failed);
        assert_eq!(
            mismatched.failures,
            vec!["--- OUTPUT (text, -want +got) ---\n-B\n+A\n"]
        );

        let passed = document.child("L10").unwrap();
        assert_eq!(passed.outcome, Outcome::Passed);
        assert_eq!(
            passed.logs,
            vec!["--- INPUT (text) ---\nc\n", "--- OUTPUT (text) ---\nC\n"]
        );
    }

    #[test]
    fn test_skipped_suite_never_calls_output() {
        let tree = Test::Suite(Suite {
            name: "skipme".to_string(),
            dir: RelativePathBuf::from("_skipme"),
            skip: true,
            tests: vec![document("d.testdown.md", vec![assertion(2, "x\n", "X\n")]).into()],
        });

        let calls = RefCell::new(0);
        let counting = |assertion: &Assertion| {
            *calls.borrow_mut() += 1;
            upper(assertion)
        };

        let mut root = Recorder::new("root");
        Runner::new(counting).run(&mut root, &tree);
        let report = root.finish();

        assert_eq!(*calls.borrow(), 0);
        let suite = report.child("skipme").unwrap();
        assert_eq!(suite.outcome, Outcome::Skipped);
        assert!(suite.children.is_empty());
        assert!(!report.failed());
    }

    #[test]
    fn test_skipped_document_and_assertion() {
        let mut skipped_assertion = assertion(6, "never\n", "wrong\n");
        skipped_assertion.skip = true;

        let mut skipped_document = document("_s.testdown.md", vec![assertion(2, "x\n", "nope\n")]);
        skipped_document.name = "s.testdown.md".to_string();
        skipped_document.skip = true;

        let tree = Test::Suite(Suite {
            name: "root".to_string(),
            dir: RelativePathBuf::from("root"),
            skip: false,
            tests: vec![
                skipped_document.into(),
                document("d.testdown.md", vec![assertion(2, "x\n", "X\n"), skipped_assertion]).into(),
            ],
        });

        let mut root = Recorder::new("root");
        Runner::new(upper).run(&mut root, &tree);
        let report = root.finish();
        let suite = report.child("root").unwrap();

        assert_eq!(suite.outcome, Outcome::Passed);
        assert_eq!(suite.child("s.testdown.md").unwrap().outcome, Outcome::Skipped);
        let document = suite.child("d.testdown.md").unwrap();
        assert_eq!(document.child("L2").unwrap().outcome, Outcome::Passed);
        assert_eq!(document.child("L6").unwrap().outcome, Outcome::Skipped);
        assert!(document.child("L6").unwrap().logs.is_empty());
    }

    #[test]
    fn test_dangling_policy() {
        let mut with_errors = document("d.testdown.md", vec![assertion(2, "x\n", "X\n")]);
        with_errors.errors.push(DanglingAssertion {
            file: RelativePathBuf::from("d.testdown.md"),
            line: 9,
        });
        let tree = Test::Document(with_errors);
        let message = "found testdown assertion at d.testdown.md:9 without a preceding code block";

        let run = |policy| {
            let mut root = Recorder::new("root");
            let options = RunOptions {
                dangling_assertions: policy,
            };
            Runner::with_options(upper, options).run(&mut root, &tree);
            root.finish().children.remove(0)
        };

        let failed = run(DanglingPolicy::Fail);
        assert_eq!(failed.outcome, Outcome::Failed);
        assert_eq!(failed.failures, vec![message]);
        assert_eq!(failed.child("L2").unwrap().outcome, Outcome::Passed);

        let logged = run(DanglingPolicy::Log);
        assert_eq!(logged.outcome, Outcome::Passed);
        assert_eq!(logged.logs, vec![message]);

        let ignored = run(DanglingPolicy::Ignore);
        assert_eq!(ignored.outcome, Outcome::Passed);
        assert!(ignored.logs.is_empty());
    }

    #[test]
    fn test_check_returns_output_on_match() {
        let runner = Runner::new(upper);
        assert_eq!(runner.check(&assertion(1, "ok\n", "OK\n")).unwrap(), "OK\n");
        assert!(matches!(
            runner.check(&assertion(1, "ok\n", "ok\n")),
            Err(Failure::Mismatch { .. })
        ));
    }
}
