//! Layered settings.
//!
//! `defaults/json-hcl.default.toml` is embedded so documented defaults and
//! runtime behavior stay in sync. Callers layer project and user files on top
//! through [`Loader`], then command-line overrides.
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

use crate::synthesize::Dialect;

const DEFAULT_TOML: &str = include_str!("../defaults/json-hcl.default.toml");

/// Optional project file picked up from the working directory.
pub const PROJECT_FILE: &str = "json-hcl.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub convert: ConvertSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertSettings {
    pub dialect: DialectSetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectSetting {
    Auto,
    Blocks,
    Nested,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub json_indent: usize,
    pub trailing_newline: bool,
}

impl DialectSetting {
    /// `Auto` decides from the output file name, when there is one.
    pub fn resolve(self, output_name: Option<&str>) -> Dialect {
        match self {
            DialectSetting::Blocks => Dialect::BlockPreferring,
            DialectSetting::Nested => Dialect::NestPreferring,
            DialectSetting::Auto => output_name.map(Dialect::for_output_name).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a settings file that must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref()).format(FileFormat::Toml).required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a settings file, skipped when absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref()).format(FileFormat::Toml).required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<Settings, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self { Self::new() }
}

pub fn load_defaults() -> Result<Settings, ConfigError> {
    Loader::new().build()
}
