//! User configuration: remote definitions, defaults and tracked repositories
//!
//! The config file is YAML. Remote URLs are templates with `${user}` and
//! `${repo}` placeholders, filled from the `user/repo` key of each tracked
//! repository unless the repository overrides them.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::{ALL_SELECTOR, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CURRENT_DIR_SELECTOR};
use crate::error::{Error, Result};
use crate::git::Operation;

/// A remote provider: its aliases and URL template
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteDefinition {
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationDefaults {
    #[serde(default)]
    pub remotes: Vec<String>,
}

/// Global defaults applied to every command
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub remotes: Vec<String>,
    pub path_prefix: Option<String>,
    pub verbose: bool,
    pub linear: bool,
    pub pull: OperationDefaults,
    pub push: OperationDefaults,
    pub fetch: OperationDefaults,
}

impl Defaults {
    /// Remote set for `operation`: its override if non-empty, else the global set
    pub fn remotes_for(&self, operation: Operation) -> &[String] {
        let specific = match operation {
            Operation::Pull => &self.pull.remotes,
            Operation::Push => &self.push.remotes,
            Operation::Fetch => &self.fetch.remotes,
        };
        if specific.is_empty() {
            &self.remotes
        } else {
            specific
        }
    }
}

/// A tracked repository after expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    /// Local path as written in the config (may start with `~`)
    pub path: String,
    /// Remote name → URL, in configured order
    pub remotes: Vec<(String, String)>,
}

impl Repo {
    /// The local path with a leading `~` replaced by the home directory
    pub fn expand_path(&self) -> PathBuf {
        expand_home(&self.path)
    }

    pub fn remote_url(&self, name: &str) -> Option<&str> {
        self.remotes
            .iter()
            .find(|(remote, _)| remote == name)
            .map(|(_, url)| url.as_str())
    }
}

/// Fully expanded configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub remotes: BTreeMap<String, RemoteDefinition>,
    pub defaults: Defaults,
    pub repos: BTreeMap<String, Repo>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    remotes: BTreeMap<String, RemoteDefinition>,
    #[serde(default)]
    defaults: Defaults,
    #[serde(default)]
    repos: Mapping,
}

/// `remotes:` inside a repository entry
#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteList {
    /// Names of remote definitions whose templates are expanded
    Names(Vec<String>),
    /// Literal name → URL pairs, no templating
    Urls(Mapping),
}

/// Per-remote override inside a repository entry
#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteOverride {
    Url(String),
    Template {
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        repo: Option<String>,
    },
}

impl Config {
    /// Reads and expands the config file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses and expands a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(contents).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
        })?;

        let mut config = Config {
            remotes: raw.remotes,
            defaults: raw.defaults,
            repos: BTreeMap::new(),
        };

        for (key, entry) in &raw.repos {
            let name = key.as_str().ok_or_else(|| Error::ConfigParse {
                message: format!("repository keys must be strings, found {key:?}"),
            })?;
            let repo = config.expand_repo(name, entry)?;
            config.repos.insert(name.to_string(), repo);
        }

        Ok(config)
    }

    fn expand_repo(&self, name: &str, entry: &Value) -> Result<Repo> {
        let (user, repo_name) = split_repo_name(name);
        let fields = match entry {
            Value::Null => Mapping::new(),
            Value::Mapping(fields) => fields.clone(),
            other => {
                return Err(Error::ConfigParse {
                    message: format!("repository {name} must be a mapping, found {other:?}"),
                })
            }
        };

        let path = match fields.get("path").and_then(Value::as_str) {
            Some(path) => path.to_string(),
            None => match &self.defaults.path_prefix {
                Some(prefix) => Path::new(prefix).join(repo_name).to_string_lossy().into_owned(),
                None => {
                    return Err(Error::ConfigParse {
                        message: format!(
                            "repository {name} has no path and defaults.path_prefix is not set"
                        ),
                    })
                }
            },
        };

        let remote_names = match fields.get("remotes") {
            None => self.defaults.remotes.clone(),
            Some(value) => match parse_value::<RemoteList>(name, "remotes", value)? {
                RemoteList::Names(names) => names,
                RemoteList::Urls(urls) => {
                    return Ok(Repo {
                        path,
                        remotes: literal_remotes(name, &urls)?,
                    })
                }
            },
        };

        let mut remotes: Vec<(String, String)> = Vec::new();
        for remote_name in remote_names {
            let remote_name = self.resolve_alias(&remote_name);
            if remotes.iter().any(|(existing, _)| *existing == remote_name) {
                continue;
            }

            let (mut remote_user, mut remote_repo) = (user.to_string(), repo_name.to_string());
            // An empty value means no override
            if let Some(value) = fields.get(remote_name.as_str()).filter(|v| !v.is_null()) {
                match parse_value::<RemoteOverride>(name, &remote_name, value)? {
                    RemoteOverride::Url(url) => {
                        remotes.push((remote_name, url));
                        continue;
                    }
                    RemoteOverride::Template { user, repo } => {
                        if let Some(user) = user.filter(|u| !u.is_empty()) {
                            remote_user = user;
                        }
                        if let Some(repo) = repo.filter(|r| !r.is_empty()) {
                            remote_repo = repo;
                        }
                    }
                }
            }

            match self.remotes.get(&remote_name) {
                Some(def) if !def.url.is_empty() => {
                    let url = expand_url(&def.url, &remote_user, &remote_repo);
                    remotes.push((remote_name, url));
                }
                _ => log::warn!("{name}: remote {remote_name} has no URL template, skipping"),
            }
        }

        Ok(Repo { path, remotes })
    }

    /// Looks up a repository by selector.
    ///
    /// Accepts `.` (the repository at the current directory), an exact tracked
    /// name, or a base name matching exactly one tracked repository.
    pub fn find_repo(&self, selector: &str) -> Option<(&str, &Repo)> {
        if selector == CURRENT_DIR_SELECTOR {
            let cwd = std::env::current_dir().ok()?;
            return self.find_repo_by_path(&cwd);
        }

        if let Some((name, repo)) = self.repos.get_key_value(selector) {
            return Some((name.as_str(), repo));
        }

        let mut matches = self
            .repos
            .iter()
            .filter(|(name, _)| crate::utils::short_name(name) == selector);
        match (matches.next(), matches.next()) {
            (Some((name, repo)), None) => Some((name.as_str(), repo)),
            _ => None,
        }
    }

    /// Finds the repository whose expanded path is `path`
    pub fn find_repo_by_path(&self, path: &Path) -> Option<(&str, &Repo)> {
        let target = normalize(path);
        self.repos
            .iter()
            .find(|(_, repo)| normalize(&repo.expand_path()) == target)
            .map(|(name, repo)| (name.as_str(), repo))
    }

    /// Every tracked repository name, sorted
    pub fn all_repos(&self) -> Vec<&str> {
        self.repos.keys().map(String::as_str).collect()
    }

    /// Maps an alias to its canonical remote name; unknown names pass through
    pub fn resolve_alias(&self, alias: &str) -> String {
        self.remotes
            .iter()
            .find(|(name, def)| *name == alias || def.aliases.iter().any(|a| a == alias))
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| alias.to_string())
    }
}

/// Default config location: `$XDG_CONFIG_HOME/goobits-remotes/config.yaml`,
/// falling back to `~/.config`
pub fn default_path() -> Result<PathBuf> {
    let config_dir = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir().ok_or(Error::NoConfigDir)?.join(".config"),
    };
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// True if the remote selector list means "every remote"
pub fn is_wildcard(selectors: &[String]) -> bool {
    selectors.is_empty() || (selectors.len() == 1 && selectors[0] == ALL_SELECTOR)
}

fn parse_value<T: serde::de::DeserializeOwned>(repo: &str, field: &str, value: &Value) -> Result<T> {
    serde_yaml::from_value(value.clone()).map_err(|e| Error::ConfigParse {
        message: format!("repository {repo}, field {field}: {e}"),
    })
}

fn literal_remotes(repo: &str, urls: &Mapping) -> Result<Vec<(String, String)>> {
    urls.iter()
        .map(|(name, url)| match (name.as_str(), url.as_str()) {
            (Some(name), Some(url)) => Ok((name.to_string(), url.to_string())),
            _ => Err(Error::ConfigParse {
                message: format!("repository {repo}: remote names and URLs must be strings"),
            }),
        })
        .collect()
}

fn expand_url(template: &str, user: &str, repo: &str) -> String {
    template.replace("${user}", user).replace("${repo}", repo)
}

/// Splits `user/repo` into its parts; a bare name has an empty user
fn split_repo_name(name: &str) -> (&str, &str) {
    match name.split_once('/') {
        Some((user, repo)) => (user, repo),
        None => ("", name),
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}

fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    std::fs::canonicalize(&absolute).unwrap_or(absolute)
}
