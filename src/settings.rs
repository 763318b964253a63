//! Layered settings: built-in defaults, then an optional TOML file, then
//! `AMI_HELPER_*` environment variables (`__` separates nested keys).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{AmiError, Result};
use crate::persist::PersistenceMode;
use crate::scope::{builtin_scopes, ScopeTable, ScopeTags};

pub const APPLICATION: &str = "ami-helper";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true, path: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Command line client used to reach the catalog.
    pub program: String,
    /// Extra arguments placed before the catalog command.
    pub arguments: Vec<String>,
    pub endpoint: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            program: "ami".to_string(),
            arguments: Vec::new(),
            endpoint: "atlas-replica".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub cache: CacheSettings,
    pub catalog: CatalogSettings,
    pub scopes: BTreeMap<String, ScopeTags>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache: CacheSettings::default(),
            catalog: CatalogSettings::default(),
            scopes: builtin_scopes(),
        }
    }
}

/// `$XDG_CONFIG_HOME/ami-helper/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APPLICATION).join("config.toml"))
}

/// Per-user location of the persisted query cache.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(APPLICATION))
        .unwrap_or_else(|| PathBuf::from(".ami-helper"))
        .join("queries.db")
}

impl Settings {
    /// Reads the settings. An explicit file must exist, the default one may not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        match explicit {
            Some(path) => builder = builder.add_source(File::from(path).required(true)),
            None => {
                if let Some(path) = default_config_path() {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }
        builder = builder.add_source(
            Environment::with_prefix("AMI_HELPER")
                .separator("__")
                .try_parsing(true),
        );
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
    /// Settings from TOML text layered over the defaults, without touching the
    /// filesystem or environment.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
    pub fn validate(&self) -> Result<()> {
        if self.catalog.program.trim().is_empty() {
            return Err(AmiError::Config("catalog.program must be non-empty".to_string()));
        }
        if self.catalog.endpoint.trim().is_empty() {
            return Err(AmiError::Config("catalog.endpoint must be non-empty".to_string()));
        }
        for (prefix, tags) in &self.scopes {
            let shorts = [&tags.evgen.short, &tags.sim.short, &tags.reco.short];
            if shorts.iter().any(|short| short.trim().is_empty()) {
                return Err(AmiError::Config(format!(
                    "scopes.{prefix} must name evgen, sim and reco short tags"
                )));
            }
        }
        Ok(())
    }
    pub fn persistence_mode(&self) -> PersistenceMode {
        if !self.cache.enabled {
            return PersistenceMode::InMemory;
        }
        PersistenceMode::File(self.cache.path.clone().unwrap_or_else(default_cache_path))
    }
    pub fn scope_table(&self) -> ScopeTable {
        ScopeTable::new(self.scopes.clone())
    }
}
