//! Line-oriented parser for block YAML.
//!
//! Supported: block mappings and sequences, plain and quoted scalars, literal
//! and folded block scalars, anchors and aliases, comments and a leading `---`.
//! Flow collections are kept as opaque scalars.
//!
//! Editing tolerance:
//! - a mapping line without a `: ` separator is a key-only pair (key being typed)
//! - `key:` followed by a deeper whitespace-only line gets an empty mapping value
//!   covering that whitespace
//! - block collections extend over the whitespace-only lines that follow them
//!   when those lines are indented at least as far as the collection
//! - the root always exists and covers the whole text

use ahash::AHashMap;
use tracing::trace;
use yls_document::LineIndex;

use crate::ast::{AstNode, NodeContent, NodeId, ScalarStyle, Span, YamlAst};
use crate::error::{ParseError, ParseErrorKind};

/// Tree plus every problem met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub ast: YamlAst,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn error(&self) -> Option<&ParseError> {
        self.errors.first()
    }
}

/// Parse a document, never failing.
pub fn parse_tolerant(text: &str) -> ParseResult {
    let mut parser = Parser::new(text);
    let root = parser.parse_document();
    trace!(
        nodes = parser.nodes.len(),
        errors = parser.errors.len(),
        "parsed document"
    );
    ParseResult {
        ast: YamlAst::from_parts(parser.nodes, root),
        errors: parser.errors,
    }
}

/// Parse a document, failing on the first problem.
pub fn parse(text: &str) -> Result<YamlAst, ParseError> {
    let ParseResult { ast, mut errors } = parse_tolerant(text);
    if errors.is_empty() {
        Ok(ast)
    } else {
        Err(errors.swap_remove(0))
    }
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    /// End of the line, terminator excluded.
    end: usize,
    /// Width of the leading whitespace.
    indent: usize,
    /// End of the content with trailing whitespace and comment removed.
    content_end: usize,
    /// Nothing but whitespace.
    whitespace: bool,
    /// Whitespace or a comment only.
    blank: bool,
}

struct Parser<'a> {
    source: &'a str,
    lines: Vec<Line>,
    pos: usize,
    nodes: Vec<AstNode>,
    anchors: AHashMap<String, NodeId>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let mut errors = Vec::new();
        let lines = split_lines(source, &mut errors);
        Self {
            source,
            lines,
            pos: 0,
            nodes: Vec::new(),
            anchors: AHashMap::new(),
            errors,
        }
    }

    fn alloc(&mut self, span: Span, content: NodeContent) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(AstNode {
            span,
            anchor: None,
            content,
        });
        id
    }

    fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id.0].span
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    fn line(&self) -> Option<Line> {
        self.lines.get(self.pos).copied()
    }

    fn skip_blank(&mut self) {
        while self.line().is_some_and(|line| line.blank) {
            self.pos += 1;
        }
    }

    fn content(&self, at: usize, line: Line) -> &'a str {
        &self.source[at.min(line.content_end)..line.content_end]
    }

    fn line_content(&self, line: Line) -> &'a str {
        self.content(line.start + line.indent, line)
    }

    fn parse_document(&mut self) -> NodeId {
        self.skip_blank();
        let root = match self.line() {
            Some(line) => self.parse_block(line.start + line.indent, line.indent),
            None => self.alloc(Span::default(), NodeContent::Mapping { pairs: Vec::new() }),
        };

        // Lines left over are less indented than the first one.
        loop {
            self.skip_blank();
            let Some(line) = self.line() else { break };
            self.error(
                ParseErrorKind::UnexpectedIndentation,
                Span::new(line.start, line.content_end),
            );
            let extra = self.parse_block(line.start + line.indent, line.indent);
            if let NodeContent::Mapping { pairs: extra_pairs } = self.nodes[extra.0].content.clone()
                && let NodeContent::Mapping { pairs } = &mut self.nodes[root.0].content
            {
                pairs.extend(extra_pairs);
            }
        }

        self.nodes[root.0].span = Span::new(0, self.source.len());
        root
    }

    /// A block node starting at byte `at` of the current line, at column `col`.
    fn parse_block(&mut self, at: usize, col: usize) -> NodeId {
        let Some(line) = self.line() else {
            return self.alloc(Span::new(at, at), NodeContent::Mapping { pairs: Vec::new() });
        };
        let text = self.content(at, line);
        if is_sequence_entry(text) {
            self.parse_sequence(at, col)
        } else if find_separator(text).is_none() && starts_inline_value(text) {
            self.parse_inline_value(at, col)
        } else {
            self.parse_mapping(at, col)
        }
    }

    fn parse_mapping(&mut self, at: usize, col: usize) -> NodeId {
        let mut pairs = Vec::new();
        let mut entry_at = at;
        loop {
            let pair = self.parse_pair(entry_at, col);
            pairs.push(pair);

            let resume = self.pos;
            self.skip_blank();
            let next = loop {
                match self.line() {
                    Some(line) if line.indent > col => {
                        self.error(
                            ParseErrorKind::UnexpectedIndentation,
                            Span::new(line.start, line.content_end),
                        );
                        self.parse_block(line.start + line.indent, line.indent);
                        self.skip_blank();
                    }
                    other => break other,
                }
            };
            match next {
                Some(line) if line.indent == col && !is_sequence_entry(self.line_content(line)) => {
                    entry_at = line.start + line.indent;
                }
                _ => {
                    self.pos = self.first_blank_after(resume);
                    break;
                }
            }
        }

        let start = self.span_of(pairs[0]).start;
        let last_end = pairs
            .iter()
            .map(|pair| self.span_of(*pair).end)
            .max()
            .unwrap_or(start);
        let end = self.extend_over_whitespace(last_end, col);
        self.alloc(Span::new(start, end), NodeContent::Mapping { pairs })
    }

    /// Index of the first line of the blank run that ends at the current line.
    fn first_blank_after(&self, resume: usize) -> usize {
        let mut idx = self.pos;
        while idx > resume && self.lines[idx - 1].blank {
            idx -= 1;
        }
        idx
    }

    fn parse_pair(&mut self, at: usize, col: usize) -> NodeId {
        let Some(line) = self.line() else {
            let key = self.scalar(at, at);
            return self.alloc(
                Span::new(at, at),
                NodeContent::MappingPair {
                    key,
                    separator: None,
                    value: None,
                },
            );
        };
        let text = self.content(at, line);
        let Some(sep) = find_separator(text) else {
            let key = self.scalar(at, line.content_end);
            self.pos += 1;
            return self.alloc(
                self.span_of(key),
                NodeContent::MappingPair {
                    key,
                    separator: None,
                    value: None,
                },
            );
        };

        let key_end = at + text[..sep].trim_end().len();
        let key = self.scalar(at, key_end);
        let separator = Span::new(at + sep, at + sep + 1);
        let rest = &text[sep + 1..];
        let rest_at = separator.end + (rest.len() - rest.trim_start().len());

        let value = if rest_at < line.content_end {
            Some(self.parse_inline_value(rest_at, col))
        } else {
            self.pos += 1;
            self.parse_nested_value(col, true)
        };
        // A pair still waiting for its value reaches to the end of its line.
        let end = value.map_or(line.end, |value| self.span_of(value).end);
        self.alloc(
            Span::new(at, end),
            NodeContent::MappingPair {
                key,
                separator: Some(separator),
                value,
            },
        )
    }

    /// Value of a `key:` or `-` whose line ended right after the indicator.
    /// `- ` lines at `col` itself belong to the value only below a key.
    fn parse_nested_value(&mut self, col: usize, below_key: bool) -> Option<NodeId> {
        let mark = self.pos;
        self.skip_blank();
        match self.line() {
            Some(line) if line.indent > col => {
                Some(self.parse_block(line.start + line.indent, line.indent))
            }
            Some(line)
                if below_key
                    && line.indent == col
                    && is_sequence_entry(self.line_content(line)) =>
            {
                Some(self.parse_sequence(line.start + line.indent, col))
            }
            _ => {
                self.pos = mark;
                self.empty_block(col)
            }
        }
    }

    /// Empty mapping standing for deeper whitespace-only lines right below a
    /// `key:` with nothing else under it.
    fn empty_block(&mut self, col: usize) -> Option<NodeId> {
        let mut span: Option<Span> = None;
        let mut consumed = self.pos;
        let mut idx = self.pos;
        while let Some(line) = self.lines.get(idx).copied() {
            if !line.blank {
                break;
            }
            if line.whitespace && line.indent > col {
                let start = line.start + col + 1;
                let end = line.start + line.indent;
                span = Some(match span {
                    Some(span) => Span::new(span.start, end),
                    None => Span::new(start, end),
                });
                consumed = idx + 1;
            }
            idx += 1;
        }
        let span = span?;
        self.pos = consumed;
        Some(self.alloc(span, NodeContent::Mapping { pairs: Vec::new() }))
    }

    fn parse_sequence(&mut self, at: usize, col: usize) -> NodeId {
        let mut items = Vec::new();
        let mut end = at;
        let mut dash_at = at;
        loop {
            let Some(line) = self.line() else { break };
            end = end.max(line.end);
            let after_dash = &self.source[dash_at + 1..line.content_end.max(dash_at + 1)];
            let item_at = dash_at + 1 + (after_dash.len() - after_dash.trim_start().len());

            if item_at >= line.content_end {
                self.pos += 1;
                if let Some(item) = self.parse_nested_value(col, false) {
                    items.push(item);
                }
            } else {
                let item_col = item_at - line.start;
                let text = self.content(item_at, line);
                let item = if is_sequence_entry(text) {
                    self.parse_sequence(item_at, item_col)
                } else if find_separator(text).is_some() {
                    self.parse_mapping(item_at, item_col)
                } else {
                    self.parse_inline_value(item_at, col)
                };
                items.push(item);
            }
            if let Some(last) = items.last() {
                end = end.max(self.span_of(*last).end);
            }

            let resume = self.pos;
            self.skip_blank();
            match self.line() {
                Some(line) if line.indent == col && is_sequence_entry(self.line_content(line)) => {
                    dash_at = line.start + line.indent;
                }
                _ => {
                    self.pos = self.first_blank_after(resume);
                    break;
                }
            }
        }

        let end = self.extend_over_whitespace(end, col);
        self.alloc(Span::new(at, end), NodeContent::Sequence { items })
    }

    /// A value written on the same line as its `key:` or `-`.
    fn parse_inline_value(&mut self, at: usize, col: usize) -> NodeId {
        let Some(line) = self.line() else {
            return self.scalar(at, at);
        };
        let text = self.content(at, line);

        if let Some(rest) = text.strip_prefix('&') {
            let name_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let name = rest[..name_len].to_string();
            let tail = &rest[name_len..];
            let value_at = at + 1 + name_len + (tail.len() - tail.trim_start().len());
            let node = if value_at < line.content_end {
                self.parse_inline_value(value_at, col)
            } else {
                self.pos += 1;
                match self.parse_nested_value(col, true) {
                    Some(node) => node,
                    None => self.scalar(at + 1 + name_len, at + 1 + name_len),
                }
            };
            self.nodes[node.0].anchor = Some(name.clone());
            self.anchors.insert(name, node);
            return node;
        }

        if let Some(rest) = text.strip_prefix('*') {
            let name = rest.split_whitespace().next().unwrap_or_default().to_string();
            let target = self.anchors.get(&name).copied();
            let span = Span::new(at, line.content_end);
            if target.is_none() {
                self.error(ParseErrorKind::UnknownAlias { name: name.clone() }, span);
            }
            self.pos += 1;
            return self.alloc(span, NodeContent::AnchorReference { name, target });
        }

        if text.starts_with('|') || text.starts_with('>') {
            return self.parse_block_scalar(at, col);
        }

        if text.starts_with('[') || text.starts_with('{') {
            self.pos += 1;
            return self.alloc(
                Span::new(at, line.content_end),
                NodeContent::Scalar {
                    value: text.to_string(),
                    style: ScalarStyle::Flow,
                },
            );
        }

        let node = self.scalar(at, line.content_end);
        self.pos += 1;
        if matches!(
            self.nodes[node.0].content,
            NodeContent::Scalar {
                style: ScalarStyle::Plain,
                ..
            }
        ) {
            self.plain_continuation(node, col);
        }
        node
    }

    /// Fold deeper lines into a multi-line plain scalar.
    fn plain_continuation(&mut self, node: NodeId, col: usize) {
        let mut folded = Vec::new();
        let mut end = self.span_of(node).end;
        while let Some(line) = self.line() {
            if line.blank || line.indent <= col {
                break;
            }
            folded.push(self.line_content(line));
            end = line.content_end;
            self.pos += 1;
        }
        if folded.is_empty() {
            return;
        }
        let node = &mut self.nodes[node.0];
        if let NodeContent::Scalar { value, .. } = &mut node.content {
            for part in folded {
                value.push(' ');
                value.push_str(part);
            }
        }
        node.span.end = end;
    }

    fn parse_block_scalar(&mut self, at: usize, col: usize) -> NodeId {
        let Some(header_line) = self.line() else {
            return self.scalar(at, at);
        };
        let header = self.content(at, header_line);
        let style = if header.starts_with('|') {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        let strip = header.contains('-');
        let keep = header.contains('+');

        self.pos += 1;
        let mut end = header_line.content_end;
        let mut body = Vec::new();
        let mut consumed = self.pos;
        let mut idx = self.pos;
        while let Some(line) = self.lines.get(idx).copied() {
            if line.whitespace {
                body.push(None);
                idx += 1;
                continue;
            }
            if line.indent <= col {
                break;
            }
            body.push(Some(line));
            end = line.end;
            idx += 1;
            consumed = idx;
        }
        self.pos = consumed;
        // Whitespace lines past the last content line are not part of the body.
        while matches!(body.last(), Some(None)) {
            body.pop();
        }

        let indent = body
            .iter()
            .flatten()
            .map(|line| line.indent)
            .min()
            .unwrap_or(0);
        let lines: Vec<&str> = body
            .iter()
            .map(|line| match line {
                Some(line) => &self.source[(line.start + indent).min(line.end)..line.end],
                None => "",
            })
            .collect();
        let mut value = match style {
            ScalarStyle::Literal => lines.join("\n"),
            _ => lines.join(" "),
        };
        if !strip && !lines.is_empty() {
            value.push('\n');
        }
        if keep && !lines.is_empty() && !value.ends_with('\n') {
            value.push('\n');
        }

        self.alloc(Span::new(at, end), NodeContent::Scalar { value, style })
    }

    /// Scalar node for `source[start..end]`, unquoting if needed.
    fn scalar(&mut self, start: usize, end: usize) -> NodeId {
        let raw = &self.source[start..end.max(start)];
        let span = Span::new(start, end.max(start));
        let (value, style) = match raw.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &raw[1..];
                let closed = !inner.is_empty() && inner.ends_with(quote);
                if !closed {
                    self.error(ParseErrorKind::UnterminatedQuote, span);
                }
                let inner = if closed {
                    &inner[..inner.len() - 1]
                } else {
                    inner
                };
                if quote == '"' {
                    (unescape_double(inner), ScalarStyle::DoubleQuoted)
                } else {
                    (inner.replace("''", "'"), ScalarStyle::SingleQuoted)
                }
            }
            _ => (raw.to_string(), ScalarStyle::Plain),
        };
        self.alloc(span, NodeContent::Scalar { value, style })
    }

    /// End of the whitespace-only lines right after the current position that
    /// are indented at least to `col`.
    fn extend_over_whitespace(&self, end: usize, col: usize) -> usize {
        let mut end = end;
        for line in &self.lines[self.pos..] {
            if !line.blank {
                break;
            }
            if line.whitespace && line.indent >= col && line.indent > 0 {
                end = end.max(line.start + line.indent);
            }
        }
        end
    }
}

fn split_lines(source: &str, errors: &mut Vec<ParseError>) -> Vec<Line> {
    let index = LineIndex::new(source);
    let mut lines = Vec::with_capacity(index.line_count());
    let mut seen_content = false;
    for n in 0..index.line_count() {
        let Some(range) = index.line_range(n) else {
            break;
        };
        let raw = &source[range.clone()];
        let text = raw.trim_end_matches(['\n', '\r']);
        let start = range.start;
        let end = start + text.len();

        let indent = text.len() - text.trim_start_matches([' ', '\t']).len();
        if let Some(tab) = text[..indent].find('\t') {
            errors.push(ParseError::new(
                ParseErrorKind::TabIndentation,
                Span::new(start + tab, start + tab + 1),
            ));
        }

        let body = &text[indent..];
        let is_marker = indent == 0 && (body == "---" || body.starts_with("--- "));
        let is_end = indent == 0 && body == "...";
        if is_end || (is_marker && seen_content) {
            break;
        }

        let content_len = strip_comment(body).trim_end().len();
        let whitespace = body.is_empty();
        let blank = content_len == 0 || is_marker;
        if !blank {
            seen_content = true;
        }
        lines.push(Line {
            start,
            end,
            indent,
            content_end: start + indent + content_len,
            whitespace,
            blank,
        });
    }
    lines
}

/// `text` without its trailing `# comment`. Quotes opened at the start of a
/// token hide `#` characters.
fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut token_start = true;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match quote {
            Some('"') if c == '\\' => {
                chars.next();
            }
            Some(q) if c == q => {
                if q == '\'' && chars.peek().is_some_and(|(_, next)| *next == '\'') {
                    chars.next();
                } else {
                    quote = None;
                }
            }
            Some(_) => {}
            None if (c == '"' || c == '\'') && token_start => quote = Some(c),
            None if c == '#' && token_start => return &text[..i],
            None => {}
        }
        token_start = c.is_whitespace() || matches!(c, ':' | '-' | '[' | '{' | ',');
    }
    text
}

/// Byte index of the `:` that separates key and value: outside quotes and
/// followed by whitespace or the end of the content.
fn find_separator(text: &str) -> Option<usize> {
    let mut search_from = 0;
    if let Some(quote @ ('"' | '\'')) = text.chars().next() {
        search_from = text[1..].find(quote).map_or(text.len(), |i| i + 2);
    }
    if text.starts_with(['[', '{', '*', '|', '>']) {
        return None;
    }
    let bytes = text.as_bytes();
    (search_from..bytes.len()).find(|&i| {
        bytes[i] == b':' && bytes.get(i + 1).is_none_or(|next| next.is_ascii_whitespace())
    })
}

fn is_sequence_entry(text: &str) -> bool {
    text == "-" || text.starts_with("- ") || text.starts_with("-\t")
}

/// Content that can only be a value, never a key.
fn starts_inline_value(text: &str) -> bool {
    text.starts_with(['*', '&', '|', '>', '[', '{', '"', '\''])
}

fn unescape_double(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
