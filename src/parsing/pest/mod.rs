//! Pest (functional, closure-based) test dialect

pub mod parser;

pub use parser::{PestParser, describe_method_name, synthetic_class, test_method_name};
