//! PHP source handling around tree-sitter
//!
//! Wraps the tree-sitter-php grammar as the syntax-tree provider. Text is
//! rewritten for known grammar quirks before parsing, and comment spans are
//! normalized afterwards so that dialect parsers see exact docblock ranges.
//!
//! **Tree-sitter ABI Version**: ABI-14 (tree-sitter-php 0.24.x)

use crate::error::{ParseError, ParseResult};
use crate::types::{Position, Span};
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

/// Token inserted between a closing tag and a reopening tag on the next line
pub const INLINE_PLACEHOLDER: &str = "___PSEUDO_INLINE_PLACEHOLDER___";

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?>\r?\n<\?").expect("Invalid regex"));

/// Separate `?>` and a following `<?` on the next line with a placeholder.
///
/// The placeholder sits on the same line as the reopening tag, so line
/// numbers after the rewrite are unchanged.
pub fn rewrite_inline_tags(code: &str) -> Cow<'_, str> {
    INLINE_TAG.replace_all(code, format!("?>\n{INLINE_PLACEHOLDER}<?").as_str())
}

/// A comment with its normalized text and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

impl Comment {
    pub fn is_doc_block(&self) -> bool {
        self.text.starts_with("/**")
    }
}

/// Strip a trailing `\n`, `\r` or `\r\n` from a comment.
///
/// The end offset shrinks by one per removed character, and the end line and
/// column are recomputed from the remaining text.
pub fn normalize_comment(comment: &mut Comment) {
    let mut trimmed = false;
    for terminator in ['\n', '\r'] {
        if comment.text.ends_with(terminator) {
            comment.text.pop();
            comment.span.end.offset -= 1;
            trimmed = true;
        }
    }
    if trimmed {
        comment.span.end = advance(comment.span.start, &comment.text);
    }
}

fn advance(start: Position, text: &str) -> Position {
    match text.rfind('\n') {
        Some(last_break) => Position {
            line: start.line + text.matches('\n').count() as u32,
            character: (text.len() - last_break - 1) as u32,
            offset: start.offset + text.len(),
        },
        None => Position {
            line: start.line,
            character: start.character + text.len() as u32,
            offset: start.offset + text.len(),
        },
    }
}

/// A parsed file: the tree, the (rewritten) text it was parsed from and its
/// normalized comments in source order
pub struct SourceTree {
    tree: Tree,
    code: String,
    file: PathBuf,
    comments: Vec<Comment>,
}

impl std::fmt::Debug for SourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTree")
            .field("file", &self.file)
            .field("comments", &self.comments.len())
            .finish()
    }
}

impl SourceTree {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Source text of a node
    pub fn text(&self, node: &Node) -> &str {
        &self.code[node.byte_range()]
    }

    /// Normalized comment starting at `offset`
    pub fn comment_at(&self, offset: usize) -> Option<&Comment> {
        self.comments
            .binary_search_by_key(&offset, |c| c.span.start.offset)
            .ok()
            .map(|i| &self.comments[i])
    }

    /// Docblock (`/** ... */`) directly preceding a declaration
    pub fn doc_comment(&self, node: &Node) -> Option<&str> {
        let prev = node.prev_named_sibling()?;
        if prev.kind() != "comment" {
            return None;
        }
        self.comment_at(prev.start_byte())
            .filter(|c| c.is_doc_block())
            .map(|c| c.text.as_str())
    }
}

/// tree-sitter-php parser producing [`SourceTree`]s
pub struct PhpSyntaxParser {
    parser: Parser,
}

impl std::fmt::Debug for PhpSyntaxParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhpSyntaxParser")
            .field("language", &"PHP")
            .finish()
    }
}

impl PhpSyntaxParser {
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| ParseError::ParserInit {
                language: "PHP".to_string(),
                reason: format!("tree-sitter error: {e}"),
            })?;
        Ok(Self { parser })
    }

    /// Parse PHP text into a tree.
    ///
    /// Any error or missing node in the tree fails the whole parse.
    pub fn parse(&mut self, text: &str, file: &Path) -> ParseResult<SourceTree> {
        let code = rewrite_inline_tags(text).into_owned();

        let tree = self
            .parser
            .parse(&code, None)
            .ok_or_else(|| ParseError::Syntax {
                line: 0,
                column: 0,
                reason: "parser produced no tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let error = first_error(root).unwrap_or(root);
            let position = error.start_position();
            debug!(
                "syntax error in {} at {}:{} ({})",
                file.display(),
                position.row + 1,
                position.column,
                error.kind()
            );
            return Err(ParseError::Syntax {
                line: position.row as u32 + 1,
                column: position.column as u32,
                reason: if error.is_missing() {
                    format!("missing {}", error.kind())
                } else {
                    "unexpected input".to_string()
                },
            });
        }

        let mut comments = Vec::new();
        collect_comments(root, &code, &mut comments);
        for comment in &mut comments {
            normalize_comment(comment);
        }

        Ok(SourceTree {
            tree,
            code,
            file: file.to_path_buf(),
            comments,
        })
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_comments(node: Node, code: &str, comments: &mut Vec<Comment>) {
    if node.kind() == "comment" {
        comments.push(Comment {
            text: code[node.byte_range()].to_string(),
            span: Span::of(&node),
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, code, comments);
    }
}
