//! Utilities for examples.
use anyhow::{bail, Result};
use csv::WriterBuilder;
use log::info;
use std::path::Path;

/// Writes per-episode curves as CSV columns, after an `episode` column.
///
/// Every curve must have the same length.
pub fn write_curves(path: impl AsRef<Path>, curves: &[(&str, &[f64])]) -> Result<()> {
    let len = curves.first().map_or(0, |(_, c)| c.len());
    if let Some((name, c)) = curves.iter().find(|(_, c)| c.len() != len) {
        bail!("Curve {} has {} points, expected {}", name, c.len(), len);
    }

    let mut wtr = WriterBuilder::new().from_path(path.as_ref())?;
    let mut header = vec!["episode"];
    header.extend(curves.iter().map(|(name, _)| *name));
    wtr.write_record(&header)?;
    for t in 0..len {
        let mut row = vec![t.to_string()];
        row.extend(curves.iter().map(|(_, c)| c[t].to_string()));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    info!("Wrote {} rows to {:?}", len, path.as_ref());
    Ok(())
}

/// Root-mean-square error between estimates and true values over `states`.
pub fn rms_error(estimates: &[f64], truth: &[f64], states: impl IntoIterator<Item = usize>) -> f64 {
    let (sum, n) = states.into_iter().fold((0.0, 0usize), |(sum, n), s| {
        let e = estimates[s] - truth[s];
        (sum + e * e, n + 1)
    });
    if n == 0 {
        0.0
    } else {
        (sum / n as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_write_curves() -> Result<()> {
        let dir = TempDir::new("curves")?;
        let path = dir.path().join("curves.csv");
        write_curves(&path, &[("a", &[1.0, 2.0]), ("b", &[0.5, 0.25])])?;

        let mut rdr = csv::Reader::from_path(&path)?;
        assert_eq!(rdr.headers()?, vec!["episode", "a", "b"]);
        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1], vec!["1", "2", "0.25"]);
        Ok(())
    }

    #[test]
    fn test_mismatched_lengths() -> Result<()> {
        let dir = TempDir::new("curves")?;
        let res = write_curves(dir.path().join("c.csv"), &[("a", &[1.0]), ("b", &[])]);
        assert!(res.is_err());
        Ok(())
    }

    #[test]
    fn test_rms_error() {
        let e = rms_error(&[0.0, 1.0, 3.0], &[0.0, 0.0, 0.0], 1..3);
        assert!((e - 5.0f64.sqrt()).abs() < 1e-12);
    }
}
