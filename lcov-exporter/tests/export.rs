// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use coverage_data::CoverageData;
use lcov_exporter::{
    create_plugin, ExportError, ExportPlugin, LcovExporter, Severity, CONFIG_FILE_NAME,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Project {
    _dir: TempDir,
    root: PathBuf,
}

impl Project {
    fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dunce::canonicalize(dir.path())?;
        Ok(Self { _dir: dir, root })
    }

    fn with_config(text: &str) -> Result<Self> {
        let project = Self::new()?;
        fs::write(project.root.join(CONFIG_FILE_NAME), text)?;
        Ok(project)
    }

    fn dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn output(&self) -> String {
        self.root.join("coverage.info").to_string_lossy().into_owned()
    }
}

fn sample_coverage(path: &Path) -> Result<CoverageData> {
    let mut data = CoverageData::new("TestRun", 0);
    let file = data
        .add_module("TestModule.exe")
        .add_file(path.to_string_lossy());
    file.add_line(1, true)?;
    file.add_line(2, false)?;
    file.add_line(3, true)?;
    Ok(data)
}

#[test]
fn test_export_relative_to_base_dir() -> Result<()> {
    let project = Project::with_config("baseDir: sub\n")?;
    let sub = project.dir("sub")?;
    let coverage = sample_coverage(&sub.join("TestFile.cpp"))?;

    let exporter = LcovExporter::new().with_start_dir(&sub);
    let output = project.output();
    let outcome = exporter.export(&coverage, Some(output.as_str()))?;

    assert_eq!(outcome.output_path, PathBuf::from(&output));
    assert_eq!(outcome.records, Some(1));
    assert!(!outcome.has_errors());

    let text = fs::read_to_string(&output)?;
    assert_eq!(
        text,
        "TN:\n\
         SF:TestFile.cpp\n\
         DA:1,1\n\
         DA:2,0\n\
         DA:3,1\n\
         LF:3\n\
         LH:2\n\
         end_of_record\n"
    );

    Ok(())
}

#[test]
fn test_export_excludes_outside_base_dir() -> Result<()> {
    let project = Project::with_config("baseDir: sub\n")?;
    let sub = project.dir("sub")?;

    let mut coverage = CoverageData::new("TestRun", 0);
    let module = coverage.add_module("TestModule.exe");
    module
        .add_file(project.root.join("other").join("b.cpp").to_string_lossy())
        .add_line(1, true)?;
    module
        .add_file(sub.join("a.cpp").to_string_lossy())
        .add_line(1, false)?;

    let exporter = LcovExporter::new().with_start_dir(&project.root);
    let output = project.output();
    let outcome = exporter.export(&coverage, Some(output.as_str()))?;

    assert_eq!(outcome.records, Some(1));

    let text = fs::read_to_string(&output)?;
    assert_eq!(text, "TN:\nSF:a.cpp\nDA:1,0\nLF:1\nLH:0\nend_of_record\n");

    assert!(outcome.messages.iter().any(|entry| {
        entry.severity == Severity::Info && entry.message.starts_with("Excluding file from report")
    }));
    assert!(outcome
        .messages
        .iter()
        .any(|entry| entry.message.starts_with("Base directory resolved to")));

    Ok(())
}

#[test]
fn test_export_without_config_keeps_paths() -> Result<()> {
    let project = Project::new()?;
    let path = project.root.join("src").join("TestFile.cpp");
    let coverage = sample_coverage(&path)?;

    let exporter = LcovExporter::new().with_start_dir(&project.root);
    let output = project.output();
    let outcome = exporter.export(&coverage, Some(output.as_str()))?;

    assert_eq!(outcome.records, Some(1));
    assert!(outcome.messages.is_empty());

    let text = fs::read_to_string(&output)?;
    let sf = format!("SF:{}\n", path.to_string_lossy().replace('\\', "/"));
    assert!(text.contains(&sf));

    Ok(())
}

#[test]
fn test_explicit_flag_disables_filtering() -> Result<()> {
    let project = Project::with_config("baseDir: sub\nincludeByBaseDir: false\n")?;
    let path = project.root.join("other").join("b.cpp");
    let coverage = sample_coverage(&path)?;

    let exporter = LcovExporter::new().with_start_dir(&project.root);
    let output = project.output();
    let outcome = exporter.export(&coverage, Some(output.as_str()))?;

    assert_eq!(outcome.records, Some(1));

    let text = fs::read_to_string(&output)?;
    assert!(text.contains("b.cpp\n"));
    assert!(!text.contains("SF:b.cpp\n"));

    Ok(())
}

#[test]
fn test_malformed_config_blocks_report() -> Result<()> {
    let project = Project::with_config("baseDir: [unclosed\n")?;
    let sub = project.dir("sub")?;
    let coverage = sample_coverage(&sub.join("TestFile.cpp"))?;

    let exporter = LcovExporter::new().with_start_dir(&sub);
    let output = project.output();
    let outcome = exporter.export(&coverage, Some(output.as_str()))?;

    assert_eq!(outcome.records, None);
    assert!(outcome.has_errors());

    // Created, but empty.
    assert_eq!(fs::read_to_string(&output)?, "");

    Ok(())
}

#[test]
fn test_empty_coverage() -> Result<()> {
    let project = Project::with_config("baseDir: sub\n")?;
    let coverage = CoverageData::new("Empty", 0);

    let exporter = LcovExporter::new().with_start_dir(&project.root);
    let output = project.output();
    let outcome = exporter.export(&coverage, Some(output.as_str()))?;

    assert_eq!(outcome.records, Some(0));
    assert!(!outcome.has_errors());
    assert_eq!(fs::read_to_string(&output)?, "");

    Ok(())
}

#[test]
fn test_unwritable_destination() -> Result<()> {
    let project = Project::new()?;
    let coverage = sample_coverage(&project.root.join("a.cpp"))?;

    let output = project
        .root
        .join("missing")
        .join("coverage.info")
        .to_string_lossy()
        .into_owned();

    let exporter = LcovExporter::new().with_start_dir(&project.root);
    let outcome = exporter.export(&coverage, Some(output.as_str()))?;

    assert_eq!(outcome.output_path, PathBuf::from(&output));
    assert_eq!(outcome.records, None);
    assert!(outcome.has_errors());
    assert!(!Path::new(&output).exists());

    Ok(())
}

#[test]
fn test_directory_argument_rejected() -> Result<()> {
    let project = Project::new()?;
    let coverage = sample_coverage(&project.root.join("a.cpp"))?;

    let output = format!("{}/", project.root.join("reports").display());

    let exporter = LcovExporter::new().with_start_dir(&project.root);
    let result = exporter.export(&coverage, Some(output.as_str()));

    assert!(matches!(result, Err(ExportError::InvalidArgument(_))));
    assert!(!project.root.join("reports").exists());

    Ok(())
}

#[test]
fn test_plugin_export_returns_path() -> Result<()> {
    let project = Project::new()?;
    let coverage = sample_coverage(&project.root.join("a.cpp"))?;
    let output = project.output();

    let plugin: Box<dyn ExportPlugin> =
        Box::new(LcovExporter::new().with_start_dir(&project.root));
    plugin.check_argument(Some(output.as_str()))?;

    let path = plugin.export(&coverage, Some(output.as_str()))?;

    assert_eq!(path, Some(PathBuf::from(&output)));
    assert!(Path::new(&output).exists());

    Ok(())
}

#[test]
fn test_create_plugin_rejects_directory() {
    let plugin = create_plugin();

    assert!(plugin.check_argument(Some("lcov.info")).is_ok());
    assert!(matches!(
        plugin.check_argument(Some("reports/")),
        Err(ExportError::InvalidArgument(_))
    ));
}
