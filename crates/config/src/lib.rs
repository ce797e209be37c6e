//! Layered configuration: built-in defaults, then a config file, then
//! `IPDSMS_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `IPDSMS_EXPORT__UTC_OFFSET=+02:00`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use ipdsms_export::{DEFAULT_STYLESHEET, ExportOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::instrument;

pub const ENV_PREFIX: &str = "IPDSMS_";
const CONFIG_STEM: &str = "config";
const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Directory name of the message sub-database, compared byte for byte
    /// (including its trailing NUL).
    pub database: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self { database: "SMS Messages\0".to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Name of the message database in a backup archive's manifest.
    pub database: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { database: "SMS Messages".to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Stylesheet `href`; an empty value omits the instruction.
    pub stylesheet: Option<String>,
    /// Offset for human-readable dates, as `+HH:MM`/`-HH:MM`, `Z` or `UTC`.
    pub utc_offset: String,
    pub indent: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            stylesheet: Some(DEFAULT_STYLESHEET.to_owned()),
            utc_offset: "+00:00".to_owned(),
            indent: 2,
        }
    }
}

impl ExportConfig {
    pub fn offset(&self) -> Result<UtcOffset> {
        parse_offset(&self.utc_offset)
    }

    pub fn stylesheet(&self) -> Option<&str> {
        self.stylesheet.as_deref().filter(|href| !href.is_empty())
    }

    /// Validate into the options the exporter takes.
    pub fn to_options(&self) -> Result<ExportOptions> {
        Ok(ExportOptions {
            stylesheet: self.stylesheet().map(str::to_owned),
            offset: self.offset()?,
            indent: self.indent,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub container: ContainerConfig,
    pub archive: ArchiveConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from defaults, a config file and the environment.
    ///
    /// With `path`, that file must exist. Without it, the first of
    /// `config.{toml,yaml,yml,json}` in the platform config directory is used
    /// if present.
    #[instrument(skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// The layered sources [`Config::load`] extracts from.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => discover(),
        };
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "loading config file");
            figment = match file.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file_exact(&file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(&file)),
                Some("json") => figment.merge(Json::file_exact(&file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.container.database.is_empty() {
            exn::bail!(ErrorKind::InvalidValue { field: "container.database", value: String::new() });
        }
        if self.archive.database.is_empty() {
            exn::bail!(ErrorKind::InvalidValue { field: "archive.database", value: String::new() });
        }
        self.export.offset()?;
        Ok(())
    }
}

fn discover() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "ipdsms")?;
    ["toml", "yaml", "yml", "json"]
        .iter()
        .map(|ext| dirs.config_dir().join(format!("{CONFIG_STEM}.{ext}")))
        .find(|path| path.is_file())
}

fn parse_offset(value: &str) -> Result<UtcOffset> {
    match value.trim() {
        "Z" | "z" | "UTC" | "utc" => Ok(UtcOffset::UTC),
        trimmed => UtcOffset::parse(trimmed, OFFSET_FORMAT)
            .or_raise(|| ErrorKind::InvalidValue { field: "export.utc_offset", value: value.to_owned() }),
    }
}
