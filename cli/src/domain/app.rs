//! Application-level exposure policy consulted when building a Formation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether an application's web process is reachable from the internet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppExposure {
    #[default]
    Private,
    Public,
}

impl AppExposure {
    pub const VALUES: &'static [&'static str] = &["private", "public"];
}

impl FromStr for AppExposure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            other => Err(format!("unknown exposure '{other}'")),
        }
    }
}

impl fmt::Display for AppExposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Private => "private",
            Self::Public => "public",
        })
    }
}

/// The slice of an application the Formation builder cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct App {
    pub name: String,
    pub exposure: AppExposure,
    /// Certificate attached to external TLS listeners.
    pub cert: Option<String>,
}

impl App {
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.exposure == AppExposure::Public
    }
}
