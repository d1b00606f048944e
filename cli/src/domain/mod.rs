//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod app;
pub mod builder;
pub mod command;
pub mod config;
pub mod constraints;
pub mod error;
pub mod image;
pub mod process;

pub use app::{App, AppExposure};
pub use builder::formation_from_procfile;
pub use command::Command;
pub use config::{SlipwayConfig, validate_config_key, validate_config_value};
pub use constraints::{Constraints, DEFAULT_CONSTRAINTS};
pub use error::{CommandError, ConfigError, ConstraintsError, FormationError, ImageError};
pub use image::Image;
pub use process::{Exposure, Formation, Process};
