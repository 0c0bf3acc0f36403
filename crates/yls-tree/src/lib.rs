//! Syntax tree for YAML-like documents.
//!
//! The tree is an arena ([`YamlAst`]) of [`AstNode`]s addressed by [`NodeId`].
//! Handles are assigned once at parse time, so node identity is a cheap
//! integer comparison rather than a structural one.
//!
//! The parser in this crate is tolerant: it accepts the half-typed documents an
//! editor produces while the user is typing and reports problems as
//! [`ParseError`]s instead of giving up.

mod ast;
mod error;
mod inspect;
mod locate;
mod parser;

pub use ast::{AstNode, NodeContent, NodeId, NodeKind, ParentChain, ScalarStyle, Span, YamlAst};
pub use error::{ParseError, ParseErrorKind};
pub use parser::{ParseResult, parse, parse_tolerant};
