//! Procfile documents: the two YAML shapes an image can declare its
//! processes in, and a parser that tells them apart.

pub mod document;
pub mod error;
pub mod parse;

pub use document::{CommandLine, Exposure, ExtendedProcfile, Process, Procfile, StandardProcfile};
pub use error::{EntryError, ParseError};
pub use parse::{marshal, parse, parse_reader};
