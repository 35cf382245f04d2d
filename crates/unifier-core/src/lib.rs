//! Core types and configuration for unifier.
//!
//! This crate defines the `unifier.toml` schema ([`UnifierConfig`]), the
//! immutable pipeline [`Config`], project/final directory resolution and
//! build-unit discovery ([`discovery`]), structure validation, and shared
//! error types.

pub mod config;
pub mod discovery;
pub mod error;
pub mod layout;

pub use config::{Config, DockerConfig, ProjectConfig, Settings, TagStrategy, UnifierConfig};
pub use discovery::{BuildUnit, discover_build_units, resolve_dirs};
pub use error::{Error, Result};
pub use layout::validate_structure;
