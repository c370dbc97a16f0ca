use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::model::RankedPeak;
use super::stats::PeakSummary;

/// Instrument CSV files start with a fixed-length preamble of rig metadata
/// before the sample rows.
pub const DEFAULT_PREAMBLE_ROWS: usize = 25;

// ---------------------------------------------------------------------------
// Instrument CSV ingestion
// ---------------------------------------------------------------------------

/// Read raw force samples from an instrument CSV.
///
/// Layout: `skip_rows` preamble lines, then `force,angle` rows with no
/// header. Only the force column is used; the sign is dropped because the
/// rig reports compression as negative. Rows whose force field does not
/// parse are skipped with a warning — the core downstream assumes a
/// well-formed sample sequence.
pub fn load_trace_csv(path: &Path, skip_rows: usize) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context("opening instrument CSV")?;

    let mut forces = Vec::new();
    let mut skipped = 0usize;

    for (row_no, result) in reader.records().enumerate().skip(skip_rows) {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = record.get(0).unwrap_or("").trim();
        match field.parse::<f64>() {
            Ok(force) if force.is_finite() => forces.push(force.abs()),
            _ => {
                log::warn!("Skipping malformed row {row_no}: {field:?}");
                skipped += 1;
            }
        }
    }

    if forces.is_empty() {
        bail!("No parsable force samples found in {}", path.display());
    }
    if skipped > 0 {
        log::info!("Skipped {skipped} malformed rows");
    }
    Ok(forces)
}

// ---------------------------------------------------------------------------
// Curated-result export
// ---------------------------------------------------------------------------

/// Write the final peak list as `rank,time,force` CSV.
pub fn export_peaks_csv(path: &Path, view: &[RankedPeak]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating peak CSV")?;
    writer
        .write_record(["rank", "time", "force"])
        .context("writing header")?;
    for row in view {
        writer
            .write_record([
                row.rank.to_string(),
                row.peak.time.to_string(),
                format!("{:.4}", row.peak.force),
            ])
            .with_context(|| format!("writing peak {}", row.rank))?;
    }
    writer.flush().context("flushing peak CSV")?;
    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    peak_count: usize,
    peaks: &'a [RankedPeak],
    /// `None` when fewer than two peaks survived curation.
    summary: Option<&'a PeakSummary>,
    insufficient_points: bool,
}

/// Write the analysis report (peaks + summary statistics) as JSON.
pub fn export_report_json(
    path: &Path,
    view: &[RankedPeak],
    summary: Option<&PeakSummary>,
) -> Result<()> {
    let report = Report {
        peak_count: view.len(),
        peaks: view,
        summary,
        insufficient_points: summary.is_none(),
    };
    let text = serde_json::to_string_pretty(&report).context("serializing report")?;
    std::fs::write(path, text).context("writing report JSON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Peak, PeakOrigin};

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn preamble_and_malformed_rows_are_skipped() {
        let mut contents = String::new();
        for i in 0..3 {
            contents.push_str(&format!("rig metadata line {i}\n"));
        }
        contents.push_str("-1.5,10\n");
        contents.push_str("not-a-number,11\n");
        contents.push_str("2.25,12\n");

        let path = write_temp("forcepeaks_loader_test.csv", &contents);
        let forces = load_trace_csv(&path, 3).unwrap();
        assert_eq!(forces, vec![1.5, 2.25]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn empty_file_is_an_error() {
        let path = write_temp("forcepeaks_loader_empty.csv", "preamble\n");
        assert!(load_trace_csv(&path, 1).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn peak_csv_round_trip() {
        let view = vec![RankedPeak {
            rank: 1,
            peak: Peak {
                id: 0,
                time: 42,
                force: 3.5,
                origin: PeakOrigin::Detected,
            },
        }];
        let path = std::env::temp_dir().join("forcepeaks_export_test.csv");
        export_peaks_csv(&path, &view).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("rank,time,force"));
        assert_eq!(lines.next(), Some("1,42,3.5000"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn report_marks_insufficient_points() {
        let path = std::env::temp_dir().join("forcepeaks_report_test.json");
        export_report_json(&path, &[], None).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"insufficient_points\": true"));
        std::fs::remove_file(path).ok();
    }
}
