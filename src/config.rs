//! Layered application configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or the `--config` file
//! 3. `DUPESCAN_*` environment variables (`DUPESCAN_IO_THREADS=4`)
//! 4. Command-line flags, applied with [`Config::merge_scan_args`]
//!
//! ```toml
//! io_threads = 4
//! output = "json"
//! keep = "shortest"
//! exclude = ["/home/me/.cache"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{OutputFormat, ScanArgs};
use crate::duplicates::FinderConfig;
use crate::output::selection::KeepPolicy;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads for stat and hash stages (0 = one per CPU).
    pub io_threads: usize,
    /// Directories always excluded, in addition to `--exclude`.
    pub exclude: Vec<PathBuf>,
    /// Report format.
    pub output: OutputFormat,
    /// Copy kept per set in reports and scripts.
    pub keep: KeepPolicy,
    /// Report destination; stdout when unset.
    pub output_file: Option<PathBuf>,
}

impl Config {
    /// Load from the default config file and the environment.
    ///
    /// Falls back to defaults when the file cannot be parsed.
    #[must_use]
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => Self::load_layers(Self::base()).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid configuration: {e:#}");
                Self::default()
            }),
        }
    }

    /// Load from `path` and the environment, falling back to defaults on error.
    ///
    /// A missing file is not an error.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::try_load_from_path(path).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid configuration {}: {e:#}", path.display());
            Self::default()
        })
    }

    /// Load from `path` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment override has an
    /// invalid value.
    pub fn try_load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        Self::load_layers(Self::base().merge(Toml::file(path)))
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn load_layers(figment: Figment) -> Result<Self> {
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Default configuration file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupescan").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    ///
    /// CLI excludes are added to configured ones; other flags replace the
    /// configured value when given.
    pub fn merge_scan_args(&mut self, args: &ScanArgs) {
        self.exclude.extend(args.exclude.iter().cloned());
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if let Some(output) = args.output {
            self.output = output;
        }
        if let Some(keep) = args.keep {
            self.keep = keep;
        }
        if let Some(ref file) = args.output_file {
            self.output_file = Some(file.clone());
        }
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default().with_io_threads(self.io_threads)
    }
}
