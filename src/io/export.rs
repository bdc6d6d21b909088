//! Export per-sample fit results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::domain::Residual;
use crate::error::AppError;

/// Write `x,y,y_fit,residual` rows to a CSV file.
pub fn write_residuals_csv(path: &Path, residuals: &[Residual]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for r in residuals {
        writer
            .serialize(r)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to write export CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = residuals.len(), "wrote residual export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("residuals.csv");
        let rows = [
            Residual { x: 0.0, y: 1.0, y_fit: 0.5, residual: 0.5 },
            Residual { x: 1.0, y: 2.0, y_fit: 2.25, residual: -0.25 },
        ];

        write_residuals_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "x,y,y_fit,residual");
        assert_eq!(lines[1], "0.0,1.0,0.5,0.5");
        assert_eq!(lines[2], "1.0,2.0,2.25,-0.25");
        assert_eq!(lines.len(), 3);
    }
}
