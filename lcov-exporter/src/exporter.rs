// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use coverage_data::CoverageData;
use thiserror::Error;

use crate::config::ResolvedConfig;
use crate::diagnostics::{ConfigLog, LogEntry, Severity};
use crate::filter::PathFilter;
use crate::lcov::write_lcov;

/// Destination used when the host passes no argument.
pub const DEFAULT_OUTPUT_FILE: &str = "lcov.info";

pub const EXPORT_PLUGIN_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid argument for LCOV export: {0:?}")]
    InvalidArgument(String),
}

/// Capabilities a host needs from an export plugin.
pub trait ExportPlugin {
    /// Reject unusable arguments before any work is done.
    fn check_argument(&self, argument: Option<&str>) -> Result<(), ExportError>;

    /// Export `coverage`, returning the path of the written report.
    fn export(
        &self,
        coverage: &CoverageData,
        argument: Option<&str>,
    ) -> Result<Option<PathBuf>, ExportError>;

    fn argument_help_description(&self) -> String;

    fn export_plugin_version(&self) -> u32;
}

/// Entry point for hosts.
pub fn create_plugin() -> Box<dyn ExportPlugin> {
    Box::new(LcovExporter::new())
}

#[derive(Debug)]
pub struct ExportOutcome {
    /// Destination of the report. Reported even when the export aborted.
    pub output_path: PathBuf,

    /// Records written, or `None` if the export aborted before serializing.
    pub records: Option<usize>,

    /// Diagnostics of this export, in the order they were logged.
    pub messages: Vec<LogEntry>,
}

impl ExportOutcome {
    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|entry| entry.severity == Severity::Error)
    }
}

/// Writes coverage as an LCOV tracefile, honoring `.covlcov`.
#[derive(Clone, Debug, Default)]
pub struct LcovExporter {
    start_dir: Option<PathBuf>,
}

impl LcovExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for `.covlcov` from `dir` instead of the current directory.
    pub fn with_start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }

    pub fn check_argument(&self, argument: Option<&str>) -> Result<(), ExportError> {
        match argument {
            Some(arg) if !has_file_name(arg) => Err(ExportError::InvalidArgument(arg.to_owned())),
            _ => Ok(()),
        }
    }

    /// Export `coverage` to `argument`, or to `lcov.info` if absent.
    ///
    /// Only an invalid argument is an `Err`. Everything else is reported in
    /// the outcome's messages, which are also flushed to the `log` facade
    /// exactly once.
    pub fn export(
        &self,
        coverage: &CoverageData,
        argument: Option<&str>,
    ) -> Result<ExportOutcome, ExportError> {
        self.check_argument(argument)?;

        let output_path = PathBuf::from(argument.unwrap_or(DEFAULT_OUTPUT_FILE));

        let mut log = ConfigLog::new();
        let config = ResolvedConfig::discover(self.start_dir.as_deref(), &mut log);

        let records = export_to_file(coverage, &output_path, &config, &mut log);

        Ok(ExportOutcome {
            output_path,
            records,
            messages: log.flush(),
        })
    }
}

fn export_to_file(
    coverage: &CoverageData,
    output_path: &Path,
    config: &ResolvedConfig,
    log: &mut ConfigLog,
) -> Option<usize> {
    let file = match File::create(output_path) {
        Ok(file) => file,
        Err(err) => {
            log.error(format!(
                "Cannot create the output file for LCOV export: {}: {}",
                output_path.display(),
                err
            ));
            return None;
        }
    };

    // A broken `.covlcov` must not yield a report that silently ignores it.
    if log.has_errors() {
        return None;
    }

    if coverage.modules().is_empty() {
        return Some(0);
    }

    let filter = PathFilter::new(config);

    if let Some(base_dir) = filter.base_dir() {
        log.info(format!(
            "Base directory resolved to: {}",
            base_dir.display()
        ));
        log.info("Only files within base directory will be included in report");
    }

    let mut writer = BufWriter::new(file);

    match write_report(coverage, &mut writer, &filter, log) {
        Ok(records) => Some(records),
        Err(err) => {
            log.error(format!(
                "Failed writing LCOV export to {}: {}",
                output_path.display(),
                err
            ));
            None
        }
    }
}

fn write_report<W: Write>(
    coverage: &CoverageData,
    writer: &mut W,
    filter: &PathFilter,
    log: &mut ConfigLog,
) -> Result<usize> {
    let records = write_lcov(coverage, writer, filter, log)?;
    writer.flush()?;
    Ok(records)
}

// A destination must name a file: not empty, not ending in a separator, and
// with a final normal component.
fn has_file_name(arg: &str) -> bool {
    match arg.chars().last() {
        None => false,
        Some(last) if std::path::is_separator(last) => false,
        Some(_) => Path::new(arg).file_name().is_some(),
    }
}

impl ExportPlugin for LcovExporter {
    fn check_argument(&self, argument: Option<&str>) -> Result<(), ExportError> {
        LcovExporter::check_argument(self, argument)
    }

    fn export(
        &self,
        coverage: &CoverageData,
        argument: Option<&str>,
    ) -> Result<Option<PathBuf>, ExportError> {
        let outcome = LcovExporter::export(self, coverage, argument)?;
        Ok(Some(outcome.output_path))
    }

    fn argument_help_description(&self) -> String {
        format!(
            " lcov exporter plugin help\n  \
             LCOV format export (optional output file)\n \
             --export_type=lcov:reports/coverage.info\n\
             If omitted, defaults to {}\n",
            DEFAULT_OUTPUT_FILE
        )
    }

    fn export_plugin_version(&self) -> u32 {
        EXPORT_PLUGIN_VERSION
    }
}
