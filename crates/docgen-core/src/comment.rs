//! Comment extraction
//!
//! A single left-to-right scan finds `//` line comments and `/* */` block
//! comments. Once inside a comment the other marker is inert: `//` inside a
//! block comment and `/*` inside a line comment are just text. Block comments do
//! not nest. This is the only place in the engine that decides comment
//! boundaries.

use logos::Logos;

use crate::span::Span;

/// Comment openers; everything else is skipped
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[^/]+")]
enum Opener {
    #[token("//")]
    Line,
    #[token("/*")]
    Block,
}

/// The kind of comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// Line comment: // ...
    Line,
    /// Block comment: /* ... */
    Block,
}

/// A comment recognised in a source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSpan {
    /// The kind of comment
    pub kind: CommentKind,
    /// From the opener to the first byte after the terminator. For line
    /// comments the end is the terminating newline itself (or end of text).
    pub span: Span,
    /// Inner text without delimiters, trimmed
    pub text: String,
}

impl CommentSpan {
    /// Byte offset just after the comment
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.end
    }
}

/// Extract all comments from `src` in source order.
#[must_use]
pub fn extract_comments(src: &str) -> Vec<CommentSpan> {
    let mut comments = Vec::new();
    let mut lexer = Opener::lexer(src);

    while let Some(token) = lexer.next() {
        // A lone '/' is not an opener
        let Ok(opener) = token else { continue };

        let start = lexer.span().start;
        let body = lexer.span().end;
        let rest = lexer.remainder();

        let (kind, inner_end, end) = match opener {
            Opener::Line => {
                let newline = rest.find('\n').map_or(src.len(), |p| body + p);
                (CommentKind::Line, newline, newline)
            }
            Opener::Block => match rest.find("*/") {
                Some(p) => (CommentKind::Block, body + p, body + p + 2),
                None => (CommentKind::Block, src.len(), src.len()),
            },
        };

        comments.push(CommentSpan {
            kind,
            span: Span::new(start, end),
            text: src[body..inner_end].trim().to_string(),
        });
        lexer.bump(end - body);
    }

    comments
}
