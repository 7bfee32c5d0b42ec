mod common;
mod java;
mod kotlin;

pub use common::{parser_for_path, CallSite, ParseError, ParsedUnit, Parser};
pub use java::JavaParser;
pub use kotlin::KotlinParser;
