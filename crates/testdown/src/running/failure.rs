use similar::{ChangeTag, TextDiff};

/// Why an assertion did not pass.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// The output function returned an error.
    #[error("--- OUTPUT (error) ---\n{0:#}")]
    Output(anyhow::Error),
    /// The output did not match the expected output.
    #[error("--- OUTPUT ({language}, -want +got) ---\n{diff}")]
    Mismatch { language: String, diff: String },
}

/// Renders a line-oriented diff from `want` to `got`.
///
/// Lines only in `want` are prefixed with `-`, lines only in `got` with `+`,
/// and shared lines with a space.
pub fn line_diff(want: &str, got: &str) -> String {
    let diff = TextDiff::from_lines(want, got);
    let mut rendered = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        rendered.push(sign);
        rendered.push_str(change.value());
        if change.missing_newline() {
            rendered.push('\n');
        }
    }

    rendered
}
