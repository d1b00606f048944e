//! Container image references.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::ImageError;

pub const DEFAULT_TAG: &str = "latest";

/// A container image, identified by repository and tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Image {
    pub repository: String,
    pub tag: String,
}

impl Image {
    #[must_use]
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }
}

impl FromStr for Image {
    type Err = ImageError;

    /// Parses `repository[:tag]`. A `:` before the last `/` belongs to a
    /// registry host port, not a tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ImageError::Invalid(s.to_owned());
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let slash = s.rfind('/').map_or(0, |i| i + 1);
        let (repository, tag) = match s[slash..].rfind(':') {
            Some(i) => (&s[..slash + i], &s[slash + i + 1..]),
            None => (s, DEFAULT_TAG),
        };

        if repository.is_empty() || tag.is_empty() || repository.ends_with('/') {
            return Err(invalid());
        }
        Ok(Self::new(repository, tag))
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
