use std::fmt::Write;
use testdown::{Assertion, Document, Suite, Test, Visitor};

/// Renders a loaded tree as an indented outline.
pub fn render(test: &Test) -> String {
    let mut listing = Listing::default();
    test.accept(&mut listing);
    listing.out
}

#[derive(Default)]
struct Listing {
    out: String,
    depth: usize,
}

impl Listing {
    fn line(&mut self, skip: bool, text: &str) {
        let marker = if skip { "[skip] " } else { "" };
        let _ = writeln!(self.out, "{}{marker}{text}", "  ".repeat(self.depth));
    }
}

impl Visitor for Listing {
    type Output = ();

    fn visit_suite(&mut self, suite: &Suite) {
        self.line(suite.skip, &format!("{}/", suite.name));
        self.depth += 1;
        for test in &suite.tests {
            test.accept(self);
        }
        self.depth -= 1;
    }

    fn visit_document(&mut self, document: &Document) {
        self.line(document.skip, &document.name);
        self.depth += 1;
        for assertion in &document.assertions {
            self.visit_assertion(assertion);
        }
        for error in &document.errors {
            self.line(false, &format!("! {error}"));
        }
        self.depth -= 1;
    }

    fn visit_assertion(&mut self, assertion: &Assertion) {
        self.line(
            assertion.skip,
            &format!(
                "{} ({} -> {})",
                assertion.name, assertion.input_language, assertion.output_language
            ),
        );
    }
}
