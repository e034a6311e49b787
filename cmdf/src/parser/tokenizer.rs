//! Line tokenizer.

/// Delimiter set used to split a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    /// Blanks and tabs. Used for `DEFINE` and `ADD`, whose expressions may contain commas.
    Whitespace,
    /// Blanks, tabs and commas. Used for `LIST` and `FOR`.
    WhitespaceAndCommas,
}

impl Delimiters {
    fn is_delimiter(self, c: char) -> bool {
        match self {
            Delimiters::Whitespace => c == ' ' || c == '\t',
            Delimiters::WhitespaceAndCommas => c == ' ' || c == '\t' || c == ',',
        }
    }
}

/// Split `line` into non-empty tokens.
pub fn tokenize(line: &str, delimiters: Delimiters) -> Vec<&str> {
    line.split(|c| delimiters.is_delimiter(c))
        .filter(|t| !t.is_empty())
        .collect()
}

/// First token of a line, if any.
pub fn keyword(line: &str) -> Option<&str> {
    tokenize(line, Delimiters::Whitespace).into_iter().next()
}
