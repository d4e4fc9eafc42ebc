//! Compare calculated classifications against an expected set and write a JSON report.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::ResultMap;
use crate::utils::Colors;

/// Expected vs calculated value for one key. `calculated` is None when the run produced no result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub expected: String,
    pub calculated: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ComparisonReport {
    pub total: usize,
    pub matches: usize,
    pub records: BTreeMap<String, Comparison>,
}

impl ComparisonReport {
    /// Share of expected keys whose calculated value matches, in percent. 0 when nothing was
    /// expected.
    pub fn match_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.matches as f64 / self.total as f64 * 100.0
    }
}

/// Build the report over every key of `expected`. Keys only in `calculated` are ignored.
pub fn compare(expected: &ResultMap, calculated: &ResultMap) -> ComparisonReport {
    let mut report = ComparisonReport {
        total: expected.len(),
        ..Default::default()
    };
    for (key, want) in expected {
        let got = calculated.get(key).cloned();
        if got.as_deref() == Some(want.as_str()) {
            report.matches += 1;
        }
        report.records.insert(
            key.clone(),
            Comparison {
                expected: want.clone(),
                calculated: got,
            },
        );
    }
    report
}

/// Load expected results from a JSON object (`{"1.txt": "good", ...}`).
pub fn load_expected(path: &Path) -> Result<ResultMap> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parse expected results {}", path.display()))
}

/// Write the per-key records as pretty JSON (non-ASCII kept as is).
pub fn write_report(report: &ComparisonReport, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report.records)
        .with_context(|| format!("write {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Compare, write the report to `out_path`, and log the match percentage.
pub fn compare_results(
    expected: &ResultMap,
    calculated: &ResultMap,
    out_path: &Path,
) -> Result<ComparisonReport> {
    let report = compare(expected, calculated);
    let pct = format!("Match percentage: {:.2}", report.match_percentage());
    let color = if report.matches == report.total {
        Colors::MATCHED
    } else {
        Colors::MISMATCHED
    };
    info!("{}", Colors::colorize(color, &pct));
    write_report(&report, out_path)?;
    info!("Comparison result file created at {}", out_path.display());
    Ok(report)
}
