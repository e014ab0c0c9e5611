pub mod context;
pub mod events;
pub mod identifier;
pub mod parser;
pub mod pest;
pub mod phpunit;
pub mod source;
pub mod test_parser;

pub use context::{ParserContext, ScopeType};
pub use events::{EventEmitter, Listener};
pub use identifier::{generate_qualified_class, generate_unique_id};
pub use parser::DialectParser;
pub use pest::PestParser;
pub use phpunit::PhpUnitParser;
pub use source::{Comment, PhpSyntaxParser, SourceTree};
pub use test_parser::TestParser;
