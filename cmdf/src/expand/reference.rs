//! Scanner for `$name` and `${name}` variable references.
//!
//! A braced reference runs to the first `}` after its `{`; a bare reference
//! runs to the next blank or tab, or to the end of the text.

use crate::error::SyntaxError;

/// How a reference was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefForm {
    Braced,
    Bare,
}

/// One reference found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Byte offset of the `$`.
    pub start: usize,
    /// Byte offset one past the reference (past the `}` when braced).
    pub end: usize,
    /// Text between the sigil (and braces) and the terminator.
    pub body: &'a str,
    pub form: RefForm,
}

enum State {
    Text,
    Sigil(usize),
    Braced { dollar: usize, open: usize },
    Bare(usize),
}

/// Find every reference in `text`, left to right.
pub fn scan_references(text: &str) -> Result<Vec<Reference<'_>>, SyntaxError> {
    let mut refs = Vec::new();
    let mut state = State::Text;

    for (i, c) in text.char_indices() {
        state = match state {
            State::Text if c == '$' => State::Sigil(i),
            State::Text => State::Text,

            State::Sigil(dollar) if c == '{' => State::Braced { dollar, open: i },
            State::Sigil(dollar) if c == ' ' || c == '\t' => {
                return Err(SyntaxError::new("empty variable reference").at(text, dollar));
            }
            State::Sigil(dollar) => State::Bare(dollar),

            State::Braced { dollar, open } if c == '}' => {
                let body = &text[open + 1..i];
                if body.is_empty() {
                    return Err(SyntaxError::new("empty variable reference").at(text, dollar));
                }
                refs.push(Reference {
                    start: dollar,
                    end: i + 1,
                    body,
                    form: RefForm::Braced,
                });
                State::Text
            }
            braced @ State::Braced { .. } => braced,

            State::Bare(dollar) if c == ' ' || c == '\t' => {
                refs.push(Reference {
                    start: dollar,
                    end: i,
                    body: &text[dollar + 1..i],
                    form: RefForm::Bare,
                });
                State::Text
            }
            bare @ State::Bare(_) => bare,
        };
    }

    match state {
        State::Text => {}
        State::Sigil(dollar) => {
            return Err(SyntaxError::new("empty variable reference").at(text, dollar));
        }
        State::Braced { open, .. } => {
            return Err(SyntaxError::new("missing closing '}' in variable reference").at(text, open));
        }
        State::Bare(dollar) => refs.push(Reference {
            start: dollar,
            end: text.len(),
            body: &text[dollar + 1..],
            form: RefForm::Bare,
        }),
    }

    Ok(refs)
}
