//! Per-scenario study output tables.
//!
//! Two delimited files are written per (run key, material) scenario: a
//! summary table with one row per thickness, and a raw buffer of the
//! per-trial absorbed fractions. Columns are explicit and named; nothing is
//! positional. Rows are flushed as they are appended so a crash mid-scan
//! loses at most the in-flight study.

use crate::core::models::summary::StudySummary;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// One row of the summary table.
#[derive(Debug, Serialize)]
struct SummaryRecord {
    thickness_m: f64,
    fraction_mean: f64,
    fraction_err: f64,
    fraction_min: f64,
    fraction_max: f64,
    total_photons_mean: f64,
    total_photons_err: f64,
    electron_aperture_mean: f64,
    electron_aperture_err: f64,
    proton_aperture_mean: f64,
    proton_aperture_err: f64,
    forward_cut_mean: f64,
    forward_cut_err: f64,
}

/// Writer for the per-thickness summary table.
pub struct SummaryTable {
    writer: csv::Writer<File>,
}

impl SummaryTable {
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
        })
    }

    /// Append one completed study and flush.
    pub fn append(&mut self, thickness: f64, summary: &StudySummary) -> Result<(), csv::Error> {
        self.writer.serialize(SummaryRecord {
            thickness_m: thickness,
            fraction_mean: summary.fraction_absorbed.mean,
            fraction_err: summary.fraction_absorbed.err,
            fraction_min: summary.fraction_range.0,
            fraction_max: summary.fraction_range.1,
            total_photons_mean: summary.total_photons.mean,
            total_photons_err: summary.total_photons.err,
            electron_aperture_mean: summary.electron_aperture_photons.mean,
            electron_aperture_err: summary.electron_aperture_photons.err,
            proton_aperture_mean: summary.proton_aperture_photons.mean,
            proton_aperture_err: summary.proton_aperture_photons.err,
            forward_cut_mean: summary.zp_positive_photons.mean,
            forward_cut_err: summary.zp_positive_photons.err,
        })?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writer for the raw per-trial fraction buffer, one row per thickness with
/// columns `thickness_m, run_0 .. run_{n-1}`.
pub struct BufferTable {
    writer: csv::Writer<File>,
    run_count: usize,
}

impl BufferTable {
    pub fn create(path: &Path, run_count: usize) -> Result<Self, csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["thickness_m".to_string()];
        header.extend((0..run_count).map(|i| format!("run_{i}")));
        writer.write_record(&header)?;
        Ok(Self { writer, run_count })
    }

    /// Append one study's fraction buffer and flush.
    pub fn append(&mut self, thickness: f64, fractions: &[f64]) -> Result<(), csv::Error> {
        debug_assert_eq!(fractions.len(), self.run_count);
        let mut row = vec![thickness.to_string()];
        row.extend(fractions.iter().map(|f| f.to_string()));
        self.writer.write_record(&row)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::summary::MeanErr;

    fn summary() -> StudySummary {
        let me = |mean, err| MeanErr { mean, err };
        StudySummary {
            fraction_absorbed: me(0.96, 0.004714),
            fraction_range: (0.95, 0.97),
            total_photons: me(1000.0, 5.0),
            electron_aperture_photons: me(100.0, 2.0),
            proton_aperture_photons: me(50.0, 1.0),
            zp_positive_photons: me(500.0, 3.0),
        }
    }

    #[test]
    fn summary_table_writes_named_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Pb_run_data.csv");

        let mut table = SummaryTable::create(&path).unwrap();
        table.append(0.05, &summary()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("thickness_m,fraction_mean,fraction_err"));
        assert!(header.ends_with("forward_cut_mean,forward_cut_err"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("0.05,0.96,0.004714,0.95,0.97,1000"));
    }

    #[test]
    fn buffer_table_writes_one_column_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Pb_run_buffer.csv");

        let mut table = BufferTable::create(&path, 3).unwrap();
        table.append(0.05, &[0.95, 0.97, 0.96]).unwrap();
        table.append(0.08, &[0.99, 0.98, 0.99]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "thickness_m,run_0,run_1,run_2");
        assert_eq!(lines.next().unwrap(), "0.05,0.95,0.97,0.96");
        assert_eq!(lines.next().unwrap(), "0.08,0.99,0.98,0.99");
    }
}
