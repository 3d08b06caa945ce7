use crate::export::{
    DEFAULT_ARCHIVE_PREFIX, DEFAULT_PADDING, DuplicateStrategy, ExportOptions, MimeTable, Packager,
    PathDeriver, ZipArchiver,
};
use crate::store::DEFAULT_STATUSES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarpicConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub filter: FilterRules,
    pub export: ExportRules,
}

impl Default for HarpicConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            filter: FilterRules::default(),
            export: ExportRules::default(),
        }
    }
}

impl HarpicConfig {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            preserve_hierarchy: self.export.preserve_hierarchy,
            strategy: self.export.strategy.into(),
            padding: self.export.padding,
        }
    }

    pub fn path_deriver(&self) -> PathDeriver {
        PathDeriver::new(MimeTable::new().with_overrides(&self.export.extensions))
    }

    pub fn packager(&self) -> Packager {
        let packager = match self.export.archive_format {
            ArchiveFormat::Zip => Packager::new(Some(Box::new(ZipArchiver))),
            ArchiveFormat::None => Packager::without_archiver(),
        };
        packager.with_archive_prefix(&self.export.archive_prefix)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Status codes offered even when no loaded entry uses them
    pub default_statuses: Vec<u16>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            default_statuses: DEFAULT_STATUSES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    #[default]
    All,
    Latest,
    Oldest,
}

impl From<StrategyName> for DuplicateStrategy {
    fn from(name: StrategyName) -> Self {
        match name {
            StrategyName::All => DuplicateStrategy::KeepAll,
            StrategyName::Latest => DuplicateStrategy::KeepLatest,
            StrategyName::Oldest => DuplicateStrategy::KeepOldest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[default]
    Zip,
    /// Multi-entry export is refused
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRules {
    pub padding: usize,
    pub strategy: StrategyName,
    pub preserve_hierarchy: bool,
    pub archive_prefix: String,
    pub archive_format: ArchiveFormat,
    /// Extra or replacement MIME → extension mappings
    pub extensions: BTreeMap<String, String>,
}

impl Default for ExportRules {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            strategy: StrategyName::All,
            preserve_hierarchy: false,
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            archive_format: ArchiveFormat::Zip,
            extensions: BTreeMap::new(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<HarpicConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<HarpicConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let config = toml::from_str::<HarpicConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })?;
    tracing::debug!(profile = %config.profile_name, path = %path.display(), "config loaded");
    Ok(config)
}

pub fn default_config() -> &'static HarpicConfig {
    static DEFAULT_CONFIG: LazyLock<HarpicConfig> = LazyLock::new(HarpicConfig::default);
    &DEFAULT_CONFIG
}
