//! Config fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};

use goobits_remotes::config::Config;

/// Builds a config whose repositories carry literal remote URLs
#[derive(Default)]
pub struct ConfigBuilder {
    linear: bool,
    repos: Vec<(String, PathBuf, Vec<(String, String)>)>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linear(mut self) -> Self {
        self.linear = true;
        self
    }

    /// Tracks `name` at `path` with the given remotes, in order
    pub fn repo(mut self, name: &str, path: &Path, remotes: &[(&str, &str)]) -> Self {
        self.repos.push((
            name.to_string(),
            path.to_path_buf(),
            remotes
                .iter()
                .map(|(remote, url)| (remote.to_string(), url.to_string()))
                .collect(),
        ));
        self
    }

    pub fn to_yaml(&self) -> String {
        let mut yaml = format!("defaults:\n  linear: {}\nrepos:\n", self.linear);
        for (name, path, remotes) in &self.repos {
            yaml.push_str(&format!("  {name}:\n    path: '{}'\n    remotes:\n", path.display()));
            for (remote, url) in remotes {
                yaml.push_str(&format!("      {remote}: '{url}'\n"));
            }
        }
        yaml
    }

    pub fn build(&self) -> Result<Config> {
        Ok(Config::from_yaml_str(&self.to_yaml())?)
    }

    /// Writes the config to `dir/config.yaml` and returns its path
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("config.yaml");
        std::fs::write(&path, self.to_yaml())?;
        Ok(path)
    }
}
