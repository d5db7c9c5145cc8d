//! Source masking
//!
//! The declaration scanner tracks braces, semicolons and decorators, none of
//! which may be trusted inside comments or string literals. Instead of a full
//! lexer we produce masked copies of the input where those spans are blanked
//! out with spaces. Every copy has exactly the same byte length and line
//! structure as the original, so offsets found in one are valid in all.

use tracing::trace;

/// An input file together with its masked views
#[derive(Debug, Clone)]
pub struct MaskedSource<'a> {
    original: &'a str,
    code: String,
    commentless: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str(char),
}

impl<'a> MaskedSource<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut code = String::with_capacity(original.len());
        let mut commentless = String::with_capacity(original.len());
        let mut state = State::Code;
        let mut chars = original.chars().peekable();

        while let Some(c) = chars.next() {
            match state {
                State::Code => match c {
                    '/' if chars.peek() == Some(&'/') => {
                        chars.next();
                        blank(&mut code, "//");
                        blank(&mut commentless, "//");
                        state = State::LineComment;
                    }
                    '/' if chars.peek() == Some(&'*') => {
                        chars.next();
                        blank(&mut code, "/*");
                        blank(&mut commentless, "/*");
                        state = State::BlockComment;
                    }
                    '\'' | '"' | '`' => {
                        code.push(c);
                        commentless.push(c);
                        state = State::Str(c);
                    }
                    _ => {
                        code.push(c);
                        commentless.push(c);
                    }
                },
                State::LineComment => {
                    if c == '\n' {
                        code.push('\n');
                        commentless.push('\n');
                        state = State::Code;
                    } else {
                        blank_char(&mut code, c);
                        blank_char(&mut commentless, c);
                    }
                }
                State::BlockComment => {
                    if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        blank(&mut code, "*/");
                        blank(&mut commentless, "*/");
                        state = State::Code;
                    } else {
                        blank_char(&mut code, c);
                        blank_char(&mut commentless, c);
                    }
                }
                State::Str(quote) => {
                    commentless.push(c);
                    if c == quote {
                        code.push(c);
                        state = State::Code;
                    } else if c == '\\' {
                        blank_char(&mut code, c);
                        if let Some(escaped) = chars.next() {
                            commentless.push(escaped);
                            blank_char(&mut code, escaped);
                        }
                    } else if c == '\n' && quote != '`' {
                        // Unterminated literal: resynchronize on the next line.
                        code.push('\n');
                        state = State::Code;
                    } else {
                        blank_char(&mut code, c);
                    }
                }
            }
        }

        trace!(len = original.len(), "masked source");
        debug_assert_eq!(code.len(), original.len());
        debug_assert_eq!(commentless.len(), original.len());

        Self {
            original,
            code,
            commentless,
        }
    }

    /// The unmodified input
    pub fn original(&self) -> &'a str {
        self.original
    }

    /// Comments and string-literal contents blanked (quotes kept)
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Only comments blanked
    pub fn commentless(&self) -> &str {
        &self.commentless
    }
}

fn blank(out: &mut String, s: &str) {
    for c in s.chars() {
        blank_char(out, c);
    }
}

fn blank_char(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat(' ').take(c.len_utf8()));
    }
}
