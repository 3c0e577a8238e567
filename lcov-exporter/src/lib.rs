// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! # lcov-exporter
//!
//! Writes host coverage results (`coverage_data::CoverageData`) as an LCOV
//! tracefile.
//!
//! Paths can be filtered and re-rooted per project by dropping a `.covlcov`
//! file somewhere at or above the working directory:
//!
//! ```yaml
//! baseDir: src              # relative to the .covlcov file, or absolute
//! includeByBaseDir: true    # defaults to true when baseDir is set
//! ```
//!
//! With filtering enabled, only files under the base directory are written,
//! and their `SF:` paths are made relative to it. A `.covlcov` that cannot be
//! read or parsed blocks the export entirely, so a broken configuration never
//! produces a silently wrong report.
//!
//! Diagnostics are collected in a [`ConfigLog`] while exporting and flushed
//! once at the end through the `log` facade.

#[macro_use]
extern crate log;

pub mod config;
pub mod diagnostics;
pub mod exporter;
pub mod filter;
pub mod lcov;
pub mod path;

pub use config::{ResolvedConfig, CONFIG_FILE_NAME};
pub use diagnostics::{ConfigLog, LogEntry, Severity};
pub use exporter::{
    create_plugin, ExportError, ExportOutcome, ExportPlugin, LcovExporter, DEFAULT_OUTPUT_FILE,
};
pub use filter::PathFilter;
pub use lcov::write_lcov;
