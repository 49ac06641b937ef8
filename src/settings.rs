/// Pager settings: defaults < config file < `PAGERUST_*` environment variables

use crate::core::PagerError;
use crate::executor::{PagerOptions, ParamNames};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_PATHS: [&str; 2] = ["/etc/pagerust/pagerust.toml", "./pagerust.toml"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagerConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    #[serde(default)]
    pub filename_prefix: String,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    #[serde(default = "default_page_param")]
    pub page_param: String,
    #[serde(default = "default_size_param")]
    pub size_param: String,
    #[serde(default = "default_export_param")]
    pub export_param: String,
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    1000
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_size_param() -> String {
    "pageSize".to_string()
}

fn default_export_param() -> String {
    "export".to_string()
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            filename_prefix: String::new(),
            export_dir: default_export_dir(),
            page_param: default_page_param(),
            size_param: default_size_param(),
            export_param: default_export_param(),
        }
    }
}

impl PagerConfig {
    /// Loads from the first config file found plus the environment,
    /// falling back to defaults when that fails
    #[must_use]
    pub fn load() -> Self {
        let path = CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists());
        Self::load_from(path).unwrap_or_else(|err| {
            tracing::warn!(%err, "could not load pager config, using defaults");
            Self::default()
        })
    }

    /// Loads from an optional file plus `PAGERUST_*` variables
    /// (e.g. `PAGERUST_DEFAULT_PAGE_SIZE=50`)
    pub fn load_from(path: Option<&Path>) -> Result<Self, PagerError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
            tracing::debug!(path = %path.display(), "pager config file added");
        }

        builder = builder.add_source(
            Environment::with_prefix("PAGERUST")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// A zero default would turn every unsized request into an empty page
    fn validate(&self) -> Result<(), PagerError> {
        if self.default_page_size == 0 {
            return Err(PagerError::InvalidConfig("default_page_size must be at least 1".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn param_names(&self) -> ParamNames {
        ParamNames {
            page: self.page_param.clone(),
            size: self.size_param.clone(),
            export: self.export_param.clone(),
        }
    }

    /// Marker options seeded from these settings
    #[must_use]
    pub fn options<T>(&self) -> PagerOptions<T> {
        PagerOptions {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            filename_prefix: self.filename_prefix.clone(),
            export_dir: self.export_dir.clone(),
            ..PagerOptions::default()
        }
    }
}
