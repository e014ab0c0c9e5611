/// The main library module for phptest
pub mod config;
pub mod definition;
pub mod discovery;
pub mod error;
pub mod io;
pub mod logging;
pub mod parsing;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use definition::{Annotations, TestDefinition};
pub use discovery::{DiscoveredFile, DiscoveryReport, SkippedFile, discover};
pub use error::{DiscoveryError, DiscoveryResult, ParseError, ParseResult};
pub use parsing::{TestParser, generate_qualified_class, generate_unique_id};
pub use types::{Position, Span, TestType};
