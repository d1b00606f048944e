use thiserror::Error;

/// A single problem found while decoding a Procfile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("{process}: command should be provided as a string or a list of strings")]
    CommandFormat { process: String },

    #[error("{process}: {message}")]
    Malformed { process: String, message: String },

    #[error("{0}")]
    Document(String),
}

/// Every problem found in one decode pass, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error parsing Procfile: {}", join(.errors))]
pub struct ParseError {
    pub errors: Vec<EntryError>,
}

impl ParseError {
    #[must_use]
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            errors: vec![EntryError::Document(message.into())],
        }
    }
}

fn join(errors: &[EntryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
