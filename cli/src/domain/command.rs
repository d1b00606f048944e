//! Process command lines.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::CommandError;

/// The argv a process is started with. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Command(Vec<String>);

impl Command {
    /// Split a shell command line into words, honouring quotes and escapes.
    ///
    /// # Errors
    ///
    /// Returns an error if the line has unbalanced quotes or no words.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let words = shlex::split(line).ok_or_else(|| CommandError::Unparseable(line.to_owned()))?;
        Self::try_from(words)
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.0
    }

    /// The executable, i.e. the first word.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.0[0]
    }
}

impl TryFrom<Vec<String>> for Command {
    type Error = CommandError;

    fn try_from(words: Vec<String>) -> Result<Self, Self::Error> {
        if words.is_empty() {
            return Err(CommandError::Empty);
        }
        Ok(Self(words))
    }
}

impl From<Command> for Vec<String> {
    fn from(command: Command) -> Self {
        command.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
