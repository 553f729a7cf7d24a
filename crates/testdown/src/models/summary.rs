use super::test::{Assertion, Document, Suite, Test, Visitor};

/// Counts of the nodes in a test tree.
///
/// Nodes below a skipped suite or document are still counted; `skipped` only
/// counts nodes that carry their own skip marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub suites: usize,
    pub documents: usize,
    pub assertions: usize,
    pub skipped: usize,
    pub dangling: usize,
}

impl Summary {
    pub fn of(test: &Test) -> Self {
        let mut summary = Summary::default();
        test.accept(&mut summary);
        summary
    }

    fn count_skip(&mut self, skip: bool) {
        if skip {
            self.skipped += 1;
        }
    }
}

impl Visitor for Summary {
    type Output = ();

    fn visit_suite(&mut self, suite: &Suite) {
        self.suites += 1;
        self.count_skip(suite.skip);
        for test in &suite.tests {
            test.accept(self);
        }
    }

    fn visit_document(&mut self, document: &Document) {
        self.documents += 1;
        self.dangling += document.errors.len();
        self.count_skip(document.skip);
        for assertion in &document.assertions {
            self.visit_assertion(assertion);
        }
    }

    fn visit_assertion(&mut self, assertion: &Assertion) {
        self.assertions += 1;
        self.count_skip(assertion.skip);
    }
}
