use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a node in a test definition tree.
///
/// Each kind is also the channel a node is published on after a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Namespace,
    Class,
    /// Grouping call of the functional dialect (`describe`)
    Describe,
    Method,
    /// A single parameterized invocation of a method
    DataSet,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Namespace => "namespace",
            TestType::Class => "class",
            TestType::Describe => "describe",
            TestType::Method => "method",
            TestType::DataSet => "data_set",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "namespace" => Ok(TestType::Namespace),
            "class" => Ok(TestType::Class),
            "describe" => Ok(TestType::Describe),
            "method" => Ok(TestType::Method),
            "data_set" | "dataset" => Ok(TestType::DataSet),
            _ => Err(format!("Unknown test type: {s}")),
        }
    }
}

/// A location in a source file.
///
/// `line` is 1-based, `character` is a 0-based byte column and `offset`
/// is the byte offset from the start of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, character: u32, offset: usize) -> Self {
        Self {
            line,
            character,
            offset,
        }
    }

    pub(crate) fn from_point(point: tree_sitter::Point, offset: usize) -> Self {
        Self {
            line: point.row as u32 + 1,
            character: point.column as u32,
            offset,
        }
    }
}

/// Start and end of a node, end exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub(crate) fn of(node: &tree_sitter::Node) -> Self {
        Self {
            start: Position::from_point(node.start_position(), node.start_byte()),
            end: Position::from_point(node.end_position(), node.end_byte()),
        }
    }
}
