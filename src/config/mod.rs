use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::layers::MeshConfig;

/// Mesh export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Binary STL, triangles only
    #[default]
    Stl,
    /// JSON scene with materials, normals and texture coordinates
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Stl => "stl",
            OutputFormat::Json => "json",
        }
    }
}

fn default_step() -> f64 {
    1.0
}
fn default_dash_length() -> f64 {
    3.0
}
fn default_gap_length() -> f64 {
    3.0
}
fn default_mark_lift() -> f64 {
    0.01
}
fn default_parallel() -> bool {
    true
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_dash_length")]
    pub dash_length: f64,
    #[serde(default = "default_gap_length")]
    pub gap_length: f64,
    #[serde(default = "default_mark_lift")]
    pub mark_lift: f64,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            format: None,
            step: default_step(),
            dash_length: default_dash_length(),
            gap_length: default_gap_length(),
            mark_lift: default_mark_lift(),
            parallel: default_parallel(),
            verbose: default_verbose(),
        }
    }
}

impl FileConfig {
    /// Load the first config file found in the search paths
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        log::warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly named config file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Engine parameters described by this file
    pub fn mesh_config(&self) -> MeshConfig {
        MeshConfig::default()
            .with_step(self.step)
            .with_dashes(self.dash_length, self.gap_length)
            .with_mark_lift(self.mark_lift)
            .with_parallel(self.parallel)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("lanemesh.toml"));
    paths.push(PathBuf::from(".lanemesh.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("lanemesh").join("config.toml"));
        paths.push(config_dir.join("lanemesh.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".lanemesh.toml"));
        paths.push(home.join(".config").join("lanemesh").join("config.toml"));
    }

    paths
}
