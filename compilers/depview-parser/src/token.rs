#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Letters and digits, with inner hyphens or apostrophes
    Word,
    /// Digits with inner `.` or `,` ("3.14", "1,000")
    Number,
    /// Split-off contraction ("n't", "'s", "'ll")
    Clitic,
    /// Round bracket, escaped on output
    Bracket,
    /// XML/HTML-like tag kept whole
    Markup,
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub span: Span,
    pub text: &'a str,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    pub fn new(span: Span, text: &'a str, kind: TokenKind) -> Self {
        Self { span, text, kind }
    }

    /// The form handed to the parser. Brackets use the escape codes that
    /// the dependency view turns back into brackets.
    pub fn escaped(&self) -> &'a str {
        match (self.kind, self.text) {
            (TokenKind::Bracket, "(") => "-RRB-",
            (TokenKind::Bracket, ")") => "-LRB-",
            (_, text) => text,
        }
    }
}
