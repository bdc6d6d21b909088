//! Whitespace-delimited data ingest.
//!
//! The input is a flat stream of floating point tokens separated by ASCII
//! whitespace (spaces, tabs, newlines). Tokens are paired in order: even
//! positions are `x`, odd positions are `y`.
//!
//! Design goals:
//! - **Strict**: a non-numeric token or an odd token count fails the whole load
//!   (no silent drops, no misalignment)
//! - **Scoped I/O**: the file is read in one call and closed before parsing
//! - **Separation of concerns**: no fitting logic here

use std::path::Path;

use crate::domain::Samples;
use crate::error::AppError;

/// Load `(x, y)` pairs from `path`, scaling every `y` by `conversion_factor`.
pub fn read_dat_file(path: &Path, conversion_factor: f64) -> Result<Samples, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read data file '{}': {e}", path.display())))?;

    let samples = parse_pairs(&content, conversion_factor)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {}", path.display(), e.message())))?;

    tracing::debug!(path = %path.display(), n = samples.len(), "loaded samples");
    Ok(samples)
}

/// Parse a whitespace-separated token stream into `(x, y)` pairs.
pub fn parse_pairs(content: &str, conversion_factor: f64) -> Result<Samples, AppError> {
    if !conversion_factor.is_finite() {
        return Err(AppError::io(format!(
            "Conversion factor must be finite, got {conversion_factor}."
        )));
    }

    let values = content
        .split_ascii_whitespace()
        .enumerate()
        .map(|(idx, token)| {
            token.parse::<f64>().map_err(|_| {
                AppError::io(format!("Token {} ('{token}') is not a number.", idx + 1))
            })
        })
        .collect::<Result<Vec<f64>, AppError>>()?;

    if values.len() % 2 != 0 {
        return Err(AppError::io(format!(
            "Expected an even number of values (x y pairs), found {}.",
            values.len()
        )));
    }

    let (x, y) = values
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1] * conversion_factor))
        .unzip();

    Ok(Samples { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_constant_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "0 1\n1 1\n2 1\n3 1\n").unwrap();

        let samples = read_dat_file(file.path(), 1.0).unwrap();
        assert_eq!(samples.x, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(samples.y, vec![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn k_pairs_yield_k_values_each() {
        let content = "0.0 1.5\n0.1\t2.5\n\n0.2 3.5   0.3 -4.5\n1e-3 6.02e2";
        let samples = parse_pairs(content, 1.0).unwrap();
        assert_eq!(samples.x.len(), 5);
        assert_eq!(samples.y.len(), 5);
        assert_eq!(samples.x[4], 1e-3);
        assert_eq!(samples.y[4], 602.0);
    }

    #[test]
    fn conversion_factor_scales_y_only() {
        let content = "1 2\n3 4\n5 -6\n";
        let plain = parse_pairs(content, 1.0).unwrap();
        let scaled = parse_pairs(content, 4.184).unwrap();

        assert_eq!(plain.x, scaled.x);
        for (a, b) in plain.y.iter().zip(&scaled.y) {
            assert_eq!(a * 4.184, *b);
        }
        assert_eq!(plain.y, vec![2.0, 4.0, -6.0]);
    }

    #[test]
    fn odd_token_count_fails() {
        let err = parse_pairs("0 1 2", 1.0).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO);
        assert!(err.message().contains("even number"));
    }

    #[test]
    fn non_numeric_token_fails() {
        let err = parse_pairs("0 1\n2 abc\n", 1.0).unwrap_err();
        assert!(err.message().contains("Token 4"), "{}", err.message());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dat_file(&dir.path().join("nope.dat"), 1.0).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO);
    }

    #[test]
    fn empty_input_is_empty_samples() {
        let samples = parse_pairs("  \n ", 1.0).unwrap();
        assert!(samples.is_empty());
    }
}
