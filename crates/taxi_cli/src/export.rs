//! Report export to JSON and CSV.

use std::fs::File;
use std::path::Path;

use anyhow::{ensure, Context};

use crate::report::FinalReport;

fn create_output_file(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Write the whole report, totals included, as pretty JSON.
pub fn export_to_json(report: &FinalReport, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let file = create_output_file(path.as_ref())?;
    serde_json::to_writer_pretty(file, report).context("failed to write JSON report")?;
    Ok(())
}

/// Write one CSV row per taxi.
pub fn export_to_csv(report: &FinalReport, path: impl AsRef<Path>) -> anyhow::Result<()> {
    ensure!(!report.taxis.is_empty(), "no taxis to export");
    let file = create_output_file(path.as_ref())?;
    let mut wtr = csv::Writer::from_writer(file);
    for row in &report.taxis {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
