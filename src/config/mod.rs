// src/config/mod.rs

//! Composefile loading, validation and translation into a [`Compose`] tree.
//!
//! - [`model`] is the TOML-backed data model.
//! - [`loader`] reads a composefile from disk.
//! - [`validate`] checks task bodies, references and cycles.
//! - [`build`] turns a validated file into composables.
//!
//! [`Compose`]: crate::compose::Compose

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use build::build;
pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ComposeFile, ConfigSection, RawComposeFile, TaskBody, TaskConfig, WatchConfig};
