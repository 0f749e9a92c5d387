//! Layered configuration
//!
//! `defaults/typeshift.default.toml` is embedded into the library, so the documented
//! defaults and the runtime behavior cannot drift apart. Callers layer user files and
//! command-line overrides on top of it through [Loader] before deserializing into
//! [ShiftConfig].

use crate::shift::convert::ConvertOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/typeshift.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ShiftConfig {
    pub annotate: AnnotateConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateConfig {
    pub placeholder: String,
}

/// Which file extensions go through which transform. Extensions are given without the dot.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub strip_extension: String,
    pub strip_output_extension: String,
    pub annotate_extension: String,
    pub annotate_output_extension: String,
    pub skip_declaration_files: bool,
}

impl ShiftConfig {
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            placeholder: self.annotate.placeholder.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start from the embedded defaults
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file that must exist
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file if it exists
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override a single key, e.g. from a command-line flag
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ShiftConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<ShiftConfig, ConfigError> {
    Loader::new().build()
}
