// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::diagnostics::ConfigLog;
use crate::path::canonicalize_or_keep;

pub const CONFIG_FILE_NAME: &str = ".covlcov";

/// On-disk form of `.covlcov`. Unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    base_dir: Option<String>,
    include_by_base_dir: Option<bool>,
}

/// Project configuration found by walking up from a start directory.
///
/// `baseDir` and `includeByBaseDir` are kept as two independent optionals:
///
/// - A present `baseDir` enables filtering on its own.
/// - A present `includeByBaseDir` overrides that either way.
/// - An absent `baseDir` resolves as `"."`, the directory of `.covlcov`.
#[derive(Debug, Default)]
pub struct ResolvedConfig {
    config_path: Option<PathBuf>,
    loaded: bool,
    syntactically_valid: bool,
    base_dir: Option<String>,
    include_by_base_dir: Option<bool>,
    resolved_base_dir: OnceCell<Option<PathBuf>>,
}

impl ResolvedConfig {
    /// Search for `.covlcov` from `start_dir` upwards and load the first one
    /// found.
    ///
    /// A missing or empty `start_dir` means the current directory. Not finding
    /// any file is the normal default case and logs nothing.
    pub fn discover(start_dir: Option<&Path>, log: &mut ConfigLog) -> Self {
        let start_dir = normalize_start_dir(start_dir);

        match find_config_upwards(&start_dir) {
            Some(found) => Self::load(found, log),
            None => Self::default(),
        }
    }

    /// Load a specific `.covlcov` file.
    ///
    /// Failures are recorded as errors in `log`, and leave the config
    /// unloaded with filtering disabled.
    pub fn load(config_path: impl Into<PathBuf>, log: &mut ConfigLog) -> Self {
        let config_path = config_path.into();

        let mut config = Self {
            config_path: Some(config_path.clone()),
            ..Self::default()
        };

        log.info(format!(
            "Loading .covlcov configuration from: {}",
            config_path.display()
        ));

        let data = match std::fs::read(&config_path) {
            Ok(data) => data,
            Err(err) => {
                log.error(format!("Failed to open .covlcov for reading: {}", err));
                return config;
            }
        };

        let file = match parse_config(&data) {
            Ok(file) => file,
            Err(err) => {
                log.error(format!("Failed to parse .covlcov: {}", err));
                return config;
            }
        };

        config.loaded = true;
        config.syntactically_valid = true;
        config.base_dir = file.base_dir;
        config.include_by_base_dir = file.include_by_base_dir;

        log.info(format!(
            "Loaded .covlcov configuration from: {}",
            config_path.display()
        ));
        log.info(format!(
            "baseDir: {}",
            config.base_dir.as_deref().unwrap_or("none")
        ));
        log.info(format!(
            "includeByBaseDir: {}",
            config.include_by_base_dir()
        ));

        config
    }

    /// Location of the `.covlcov` that was found, even if it failed to load.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// True if a well-formed mapping was found and read.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_syntactically_valid(&self) -> bool {
        self.syntactically_valid
    }

    /// `baseDir` exactly as written, if present.
    pub fn base_dir(&self) -> Option<&str> {
        self.base_dir.as_deref()
    }

    /// Whether files should be filtered by, and made relative to, the base
    /// directory.
    pub fn include_by_base_dir(&self) -> bool {
        self.include_by_base_dir
            .unwrap_or_else(|| self.base_dir.is_some())
    }

    /// Absolute base directory, or `None` if no configuration was loaded.
    ///
    /// Pure path arithmetic: the directory need not exist.
    pub fn resolved_base_dir(&self) -> Option<&Path> {
        self.resolved_base_dir
            .get_or_init(|| {
                if !self.loaded {
                    return None;
                }

                let config_path = self.config_path.as_deref()?;
                let raw = self.base_dir.as_deref().unwrap_or(".");

                Some(resolve_base_dir(config_path, raw))
            })
            .as_deref()
    }
}

fn parse_config(data: &[u8]) -> Result<ConfigFile> {
    let value: serde_yaml::Value = serde_yaml::from_slice(data)?;

    if !value.is_mapping() {
        bail!("top-level value is not a mapping");
    }

    Ok(serde_yaml::from_value(value)?)
}

fn resolve_base_dir(config_path: &Path, raw: &str) -> PathBuf {
    let raw = Path::new(raw);

    if raw.is_absolute() {
        return raw.to_owned();
    }

    let config_dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => std::env::current_dir().unwrap_or_default(),
    };

    if raw == Path::new(".") {
        config_dir
    } else {
        config_dir.join(raw)
    }
}

fn normalize_start_dir(start_dir: Option<&Path>) -> PathBuf {
    let start_dir = match start_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
        _ => std::env::current_dir().unwrap_or_default(),
    };

    canonicalize_or_keep(&start_dir)
}

/// Walk from `start_dir` towards the filesystem root, returning the first
/// `.covlcov` found.
pub fn find_config_upwards(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);

        if candidate.exists() {
            debug!("found {}", candidate.display());
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) if parent != current && !parent.as_os_str().is_empty() => {
                current = parent;
            }
            _ => return None,
        }
    }
}
