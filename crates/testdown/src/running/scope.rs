use std::fmt;

/// The capabilities the runner needs from a test framework.
///
/// A scope is a named unit of execution that can contain nested scopes, be
/// skipped, and pass or fail. Implementations decide how (and whether) scopes
/// that declare [`Scope::parallel`] actually run concurrently.
///
/// Rust cannot abandon a closure part way through the way some frameworks
/// end a test, so [`Scope::fatal`] and [`Scope::skip_now`] only mark the scope
/// as finished. Callers return straight after invoking them, and
/// implementations ignore anything reported on a finished scope.
pub trait Scope: Sized {
    /// Marks the caller as a helper for failure attribution.
    fn helper(&mut self) {}

    /// Declares that this scope may run concurrently with its siblings.
    fn parallel(&mut self);

    /// Runs `f` in a new child scope named `name`.
    ///
    /// Returns false if the child failed.
    fn run<F>(&mut self, name: &str, f: F) -> bool
    where
        F: FnOnce(&mut Self);

    /// Records informational output.
    fn log(&mut self, message: fmt::Arguments<'_>);

    /// Marks the scope as failed and carries on.
    fn error(&mut self, message: fmt::Arguments<'_>);

    /// Marks the scope as failed and finished.
    fn fatal(&mut self, message: fmt::Arguments<'_>);

    /// Marks the scope as skipped and finished.
    fn skip_now(&mut self);
}
