//! Settings file and the resolved pipeline configuration
//!
//! Values come from an optional TOML file and are overridden by flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use pidcat_term::DEFAULT_TAG_WIDTH;
use pidcat_types::Severity;

use crate::cli::Args;

/// Contents of `config.toml`
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub adb_path: Option<String>,
    pub min_level: Option<String>,
    pub ignore_tags: Vec<String>,
    pub tag_width: Option<usize>,
}

impl Settings {
    /// `<config dir>/pidcat/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pidcat").join("config.toml"))
    }

    /// Load settings from `explicit`, or from the default location
    ///
    /// A missing default file just means defaults; an explicit file must
    /// exist and parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing settings in {}", path.display()))
    }
}

/// Everything the pipeline needs, fixed for the run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Packages whose pids are watched (empty = all)
    pub packages: Vec<String>,
    pub min_level: Severity,
    /// Tags to show (empty = all)
    pub tags: Vec<String>,
    /// Tags to hide
    pub ignore_tags: Vec<String>,
    pub log_file: Option<PathBuf>,
    pub tag_width: usize,
}

impl PipelineConfig {
    pub fn new(args: &Args, settings: &Settings, packages: Vec<String>) -> Result<Self> {
        let min_level = match (args.min_level, &settings.min_level) {
            (Some(level), _) => level,
            (None, Some(level)) => level
                .parse()
                .with_context(|| format!("min_level in settings: '{level}'"))?,
            (None, None) => Severity::Verbose,
        };

        let mut ignore_tags = settings.ignore_tags.clone();
        for tag in &args.filter_tags {
            if !ignore_tags.contains(tag) {
                ignore_tags.push(tag.clone());
            }
        }

        Ok(Self {
            packages,
            min_level,
            tags: args.match_tags.clone(),
            ignore_tags,
            log_file: args.log_file.clone(),
            tag_width: settings.tag_width.unwrap_or(DEFAULT_TAG_WIDTH),
        })
    }
}
