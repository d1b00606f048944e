//! Resource constraints applied to each process instance.
//!
//! Pure functions only: no I/O, no async.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConstraintsError;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Memory limit in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memory(pub u64);

/// Relative CPU weight, 2..=1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CpuShare(pub u16);

/// Maximum number of processes; 0 means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nproc(pub u64);

/// Memory, CPU and process-count limits for one process instance.
///
/// Deserializes from the field mapping it serializes to, or from any string
/// [`FromStr`] accepts, so a Formation document may say `constraints: 2X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConstraintsRepr")]
pub struct Constraints {
    pub memory: Memory,
    pub cpu_share: CpuShare,
    pub nproc: Nproc,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConstraintsRepr {
    Text(String),
    Fields {
        memory: Memory,
        cpu_share: CpuShare,
        nproc: Nproc,
    },
}

impl TryFrom<ConstraintsRepr> for Constraints {
    type Error = ConstraintsError;

    fn try_from(repr: ConstraintsRepr) -> Result<Self, Self::Error> {
        match repr {
            ConstraintsRepr::Text(s) => s.parse(),
            ConstraintsRepr::Fields {
                memory,
                cpu_share,
                nproc,
            } => Ok(Constraints {
                memory,
                cpu_share,
                nproc,
            }),
        }
    }
}

pub const ONE_X: Constraints = Constraints {
    memory: Memory(512 * MB),
    cpu_share: CpuShare(256),
    nproc: Nproc(256),
};

pub const TWO_X: Constraints = Constraints {
    memory: Memory(GB),
    cpu_share: CpuShare(512),
    nproc: Nproc(512),
};

pub const PX: Constraints = Constraints {
    memory: Memory(6 * GB),
    cpu_share: CpuShare(1024),
    nproc: Nproc(0),
};

/// Named presets accepted wherever constraints are parsed.
pub const NAMED_CONSTRAINTS: &[(&str, Constraints)] = &[("1X", ONE_X), ("2X", TWO_X), ("PX", PX)];

/// Constraints given to a process that has no previous configuration.
pub const DEFAULT_CONSTRAINTS: Constraints = ONE_X;

impl Default for Constraints {
    fn default() -> Self {
        DEFAULT_CONSTRAINTS
    }
}

impl Constraints {
    /// The preset name these constraints match, if any.
    #[must_use]
    pub fn preset_name(&self) -> Option<&'static str> {
        NAMED_CONSTRAINTS
            .iter()
            .find(|(_, c)| c == self)
            .map(|(name, _)| *name)
    }
}

impl FromStr for Memory {
    type Err = ConstraintsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConstraintsError::InvalidMemory(s.to_owned());
        let upper = s.trim().to_ascii_uppercase();
        let (digits, unit) = match upper.find(|c: char| !c.is_ascii_digit()) {
            Some(i) => upper.split_at(i),
            None => (upper.as_str(), ""),
        };
        let n: u64 = digits.parse().map_err(|_| invalid())?;
        let multiplier = match unit {
            "" | "B" => 1,
            "KB" | "K" => KB,
            "MB" | "M" => MB,
            "GB" | "G" => GB,
            _ => return Err(invalid()),
        };
        n.checked_mul(multiplier).map(Memory).ok_or_else(invalid)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes != 0 && bytes % GB == 0 {
            write!(f, "{}GB", bytes / GB)
        } else if bytes != 0 && bytes % MB == 0 {
            write!(f, "{}MB", bytes / MB)
        } else if bytes != 0 && bytes % KB == 0 {
            write!(f, "{}KB", bytes / KB)
        } else {
            write!(f, "{bytes}")
        }
    }
}

impl FromStr for CpuShare {
    type Err = ConstraintsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u16>() {
            Ok(n) if (2..=1024).contains(&n) => Ok(CpuShare(n)),
            _ => Err(ConstraintsError::InvalidCpuShare(s.to_owned())),
        }
    }
}

impl FromStr for Nproc {
    type Err = ConstraintsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Nproc)
            .map_err(|_| ConstraintsError::InvalidNproc(s.to_owned()))
    }
}

impl FromStr for Constraints {
    type Err = ConstraintsError;

    /// Accepts a preset name (`1X`, `2X`, `PX`) or `cpushare:memory[:nproc]`.
    /// When `nproc` is omitted the process count is unlimited.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((_, c)) = NAMED_CONSTRAINTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        {
            return Ok(*c);
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [cpu, mem] => Ok(Constraints {
                cpu_share: cpu.parse()?,
                memory: mem.parse()?,
                nproc: Nproc(0),
            }),
            [cpu, mem, nproc] => Ok(Constraints {
                cpu_share: cpu.parse()?,
                memory: mem.parse()?,
                nproc: nproc.parse()?,
            }),
            _ => Err(ConstraintsError::InvalidFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.preset_name() {
            return f.write_str(name);
        }
        write!(f, "{}:{}", self.cpu_share.0, self.memory)?;
        if self.nproc.0 != 0 {
            write!(f, ":{}", self.nproc.0)?;
        }
        Ok(())
    }
}
