//! The test tree produced by the loader and consumed by the runner.
//!
//! A tree is built once from a single root path and is never mutated
//! afterwards. Directories become [`Suite`]s, test documents become
//! [`Document`]s and each input/expected-output pair inside a document becomes
//! an [`Assertion`].

pub mod summary;

pub use summary::Summary;
pub use test::{Assertion, DanglingAssertion, Document, Suite, Test, Visitor};
