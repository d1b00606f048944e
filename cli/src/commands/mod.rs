//! Command implementations

pub mod config;
pub mod formation;
pub mod inspect;
pub mod procfile;
pub mod validate;
pub mod version;
