// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Write;

use anyhow::Result;
use coverage_data::{CoverageData, FileCoverage};

use crate::diagnostics::ConfigLog;
use crate::filter::PathFilter;
use crate::path::generic_path_string;

/// Write one LCOV record per included source file, in module and file order.
///
/// Files rejected by `filter` are skipped and logged. Returns the number of
/// records written.
pub fn write_lcov<W: Write>(
    coverage: &CoverageData,
    writer: &mut W,
    filter: &PathFilter,
    log: &mut ConfigLog,
) -> Result<usize> {
    let mut records = 0;

    for module in coverage.modules() {
        for file in module.files() {
            if !filter.should_include(&file.path) {
                log.info(format!(
                    "Excluding file from report. Not within configured include path: {}",
                    file.path
                ));
                continue;
            }

            let report_path = filter.make_report_path(&file.path);
            write_record(writer, &generic_path_string(&report_path), file)?;
            records += 1;
        }
    }

    Ok(records)
}

// TN:
// SF:<path>
// DA:<line>,<0|1>
// LF:<lines found>
// LH:<lines hit>
// end_of_record
fn write_record<W: Write>(writer: &mut W, source_path: &str, file: &FileCoverage) -> Result<()> {
    writeln!(writer, "TN:")?;
    writeln!(writer, "SF:{}", source_path)?;

    // Stored order, one entry per line record. Hits are only known as 0 or 1.
    for line in file.lines() {
        writeln!(writer, "DA:{},{}", line.line_number, u8::from(line.executed))?;
    }

    writeln!(writer, "LF:{}", file.lines_found())?;
    writeln!(writer, "LH:{}", file.lines_hit())?;
    writeln!(writer, "end_of_record")?;

    Ok(())
}
