// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::{Path, PathBuf};

use crate::config::ResolvedConfig;
use crate::path::{canonicalize_or_keep, escapes_base, lexically_relative};

/// Decides which source files go into the report, and under what path.
///
/// With no usable base directory the filter is disabled: every file is
/// included and every path is passed through unchanged.
#[derive(Clone, Debug, Default)]
pub struct PathFilter {
    // Canonical base directory, present only when filtering is enabled.
    base_dir: Option<PathBuf>,
}

impl PathFilter {
    pub fn new(config: &ResolvedConfig) -> Self {
        if !config.is_syntactically_valid() || !config.include_by_base_dir() {
            return Self::disabled();
        }

        match config.resolved_base_dir() {
            Some(base_dir) => Self::with_base_dir(base_dir),
            None => Self::disabled(),
        }
    }

    /// Filter on `base_dir` directly, bypassing configuration.
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = canonicalize_or_keep(base_dir.as_ref());

        Self {
            base_dir: Some(base_dir),
        }
    }

    pub fn disabled() -> Self {
        Self { base_dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.base_dir.is_some()
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// True if `path` lies strictly inside the base directory.
    pub fn should_include(&self, path: impl AsRef<Path>) -> bool {
        let base_dir = match &self.base_dir {
            Some(base_dir) => base_dir,
            None => return true,
        };

        let relative = relative_to(path.as_ref(), base_dir);

        // Empty means the path is the base directory itself, or unrelated to it.
        if relative.as_os_str().is_empty() {
            return false;
        }

        !escapes_base(&relative)
    }

    /// Path to write after `SF:`.
    ///
    /// Relative to the base directory when filtering is enabled and `path` is
    /// inside it, otherwise `path` unchanged.
    pub fn make_report_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();

        let base_dir = match &self.base_dir {
            Some(base_dir) => base_dir,
            None => return path.to_owned(),
        };

        let relative = relative_to(path, base_dir);

        if relative.as_os_str().is_empty() || escapes_base(&relative) {
            return path.to_owned();
        }

        relative
    }
}

// Relative input paths are resolved against the current directory.
fn relative_to(path: &Path, base_dir: &Path) -> PathBuf {
    let canonical = canonicalize_or_keep(path);

    lexically_relative(&canonical, base_dir)
}
