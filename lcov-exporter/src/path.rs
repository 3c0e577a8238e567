// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Path arithmetic shared by the config resolver and the path filter.
//!
//! Nothing here requires the input paths to exist. Only
//! [`weakly_canonicalize`] touches the filesystem, and only to resolve the
//! existing prefix of a path.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use path_absolutize::Absolutize;

/// Absolute, symlink-resolved form of `path`.
///
/// `path` is made absolute against the current directory with `.` and `..`
/// folded, then its longest existing prefix is canonicalized and the rest
/// appended. Errors other than a missing component are returned.
pub fn weakly_canonicalize(path: &Path) -> Result<PathBuf> {
    let path = path.absolutize()?;
    let components: Vec<Component> = path.components().collect();

    for split in (1..=components.len()).rev() {
        let existing: PathBuf = components[..split].iter().collect();

        match dunce::canonicalize(&existing) {
            Ok(mut canonical) => {
                canonical.extend(&components[split..]);
                return Ok(canonical);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    anyhow::bail!("no existing prefix of {}", path.display())
}

/// [`weakly_canonicalize`], or `path` made absolute if that fails.
pub fn canonicalize_or_keep(path: &Path) -> PathBuf {
    match weakly_canonicalize(path) {
        Ok(canonical) => canonical,
        Err(err) => {
            debug!(
                "unable to canonicalize {}, using it as given: {}",
                path.display(),
                err
            );

            match path.absolutize() {
                Ok(absolute) => absolute.into_owned(),
                Err(_) => path.to_owned(),
            }
        }
    }
}

/// Path of `path` relative to `base`, by segment arithmetic alone.
///
/// Returns an empty path when the two cannot be related (different roots, or
/// one absolute and the other not), when `path` is `base` itself, or when
/// `base` climbs out with `..` further than it descends.
pub fn lexically_relative(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    if root_of(&path_parts) != root_of(&base_parts) {
        return PathBuf::new();
    }

    pathdiff::diff_paths(path, base).unwrap_or_default()
}

// Prefix and root-directory components, which must match to relate paths.
fn root_of<'a>(parts: &[Component<'a>]) -> Vec<Component<'a>> {
    parts
        .iter()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .copied()
        .collect()
}

/// True if the first segment of `path` is `..`.
pub fn escapes_base(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::ParentDir))
}

/// Render `path` with forward slashes, as LCOV consumers expect.
pub fn generic_path_string(path: &Path) -> String {
    let text = path.to_string_lossy();

    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}
