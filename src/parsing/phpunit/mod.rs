//! PHPUnit (class/method) test dialect

pub mod annotations;
pub mod parser;

pub use annotations::{DocTag, Markers, parse_doc_block};
pub use parser::PhpUnitParser;
