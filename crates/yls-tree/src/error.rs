use crate::ast::Span;

/// A problem found while parsing. Parsing itself never stops on one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {}..{}", .span.start, .span.end)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("tab character used for indentation")]
    TabIndentation,
    #[error("unterminated quoted scalar")]
    UnterminatedQuote,
    #[error("unknown alias `*{name}`")]
    UnknownAlias { name: String },
    #[error("unexpected indentation")]
    UnexpectedIndentation,
}
