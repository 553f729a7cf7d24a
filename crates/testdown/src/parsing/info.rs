/// The result of parsing the info string of a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeInfo {
    pub language: String,
    /// The block holds expected output rather than input.
    pub is_assertion: bool,
    /// Only ever set on assertion blocks.
    pub skip: bool,
}

impl CodeInfo {
    pub const DEFAULT_LANGUAGE: &'static str = "text";
    pub const ASSERTION: &'static str = "testdown";
    pub const SKIP: &'static str = "skip";

    /// Parses a whitespace separated info string such as `json testdown skip`.
    ///
    /// The first token names the language, unless it is the assertion marker
    /// itself, in which case the language stays at the default.
    pub fn parse(info: Option<&str>) -> Self {
        let mut fields = info.unwrap_or_default().split_whitespace().peekable();

        let language = match fields.peek() {
            Some(&first) if first != Self::ASSERTION => first.to_string(),
            _ => Self::DEFAULT_LANGUAGE.to_string(),
        };

        let mut is_assertion = false;
        let mut skip = false;
        for field in fields {
            match field {
                Self::ASSERTION => is_assertion = true,
                Self::SKIP => skip = true,
                _ => {}
            }
        }

        Self {
            language,
            is_assertion,
            skip: is_assertion && skip,
        }
    }
}
