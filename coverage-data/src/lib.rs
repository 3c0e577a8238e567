// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory coverage results as handed over by the host after a run.
//!
//! The tree is `CoverageData` → `ModuleCoverage` → `FileCoverage` →
//! `LineCoverage`. Every level keeps its children in insertion order; nothing
//! is sorted or deduplicated.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct CoverageData {
    /// Name of the coverage run.
    pub name: String,

    /// Exit code of the covered program.
    #[serde(default)]
    pub exit_code: i32,

    #[serde(default)]
    pub modules: Vec<ModuleCoverage>,
}

impl CoverageData {
    pub fn new(name: impl Into<String>, exit_code: i32) -> Self {
        Self {
            name: name.into(),
            exit_code,
            modules: vec![],
        }
    }

    pub fn add_module(&mut self, path: impl Into<String>) -> &mut ModuleCoverage {
        self.modules.push(ModuleCoverage::new(path));

        // Just pushed.
        let last = self.modules.len() - 1;
        &mut self.modules[last]
    }

    pub fn modules(&self) -> &[ModuleCoverage] {
        &self.modules
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(text)?;
        data.validate()?;
        Ok(data)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        for module in &self.modules {
            for file in &module.files {
                if file.lines.iter().any(|line| line.line_number == 0) {
                    bail!("source lines must be 1-indexed: {}", file.path);
                }
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct ModuleCoverage {
    /// Path of the executable or library.
    pub path: String,

    #[serde(default)]
    pub files: Vec<FileCoverage>,
}

impl ModuleCoverage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            files: vec![],
        }
    }

    pub fn add_file(&mut self, path: impl Into<String>) -> &mut FileCoverage {
        self.files.push(FileCoverage::new(path));

        let last = self.files.len() - 1;
        &mut self.files[last]
    }

    pub fn files(&self) -> &[FileCoverage] {
        &self.files
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct FileCoverage {
    /// Path of the source file, as reported by the host. Usually absolute.
    pub path: String,

    #[serde(default)]
    pub lines: Vec<LineCoverage>,
}

impl FileCoverage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            lines: vec![],
        }
    }

    pub fn add_line(&mut self, line_number: u32, executed: bool) -> Result<()> {
        let line = LineCoverage::new(line_number, executed)?;
        self.lines.push(line);
        Ok(())
    }

    pub fn lines(&self) -> &[LineCoverage] {
        &self.lines
    }

    /// Count of line entries, duplicates included.
    pub fn lines_found(&self) -> usize {
        self.lines.len()
    }

    pub fn lines_hit(&self) -> usize {
        self.lines.iter().filter(|line| line.executed).count()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct LineCoverage {
    /// Line number in the source file (1-indexed).
    pub line_number: u32,

    pub executed: bool,
}

impl LineCoverage {
    pub fn new(line_number: u32, executed: bool) -> Result<Self> {
        if line_number == 0 {
            bail!("source lines must be 1-indexed");
        }

        Ok(Self {
            line_number,
            executed,
        })
    }
}
