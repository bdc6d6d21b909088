//! Read/write fitted parameter JSON files.
//!
//! The file holds the parameter mapping only (name -> value), in model order,
//! indented with four spaces:
//!
//! ```text
//! {
//!     "a0": 1.0,
//!     "a1": -0.25,
//!     "w": 0.5
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::domain::ParamSet;
use crate::error::AppError;

const INDENT: &[u8] = b"    ";

/// Write a parameter JSON file, replacing any existing file.
pub fn write_params_json(path: &Path, params: &ParamSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create parameter file '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
    params
        .serialize(&mut ser)
        .map_err(|e| AppError::io(format!("Failed to write parameter JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::io(format!("Failed to write parameter JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to write parameter JSON: {e}")))?;

    tracing::info!(path = %path.display(), n = params.len(), "wrote fitted parameters");
    Ok(())
}

/// Read a parameter JSON file.
pub fn read_params_json(path: &Path) -> Result<BTreeMap<String, f64>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open parameter file '{}': {e}", path.display())))?;
    let values: BTreeMap<String, f64> = serde_json::from_reader(file)
        .map_err(|e| AppError::io(format!("Invalid parameter JSON '{}': {e}", path.display())))?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_indented_json_in_model_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.json");
        let params = ParamSet::new(
            vec!["a0".into(), "a1".into(), "w".into()],
            vec![1.0, -0.25, 0.5],
        );

        write_params_json(&path, &params).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"a0\": 1.0,\n    \"a1\": -0.25,\n    \"w\": 0.5\n}\n");

        let back = read_params_json(&path).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back["a1"], -0.25);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.json");
        std::fs::write(&path, "stale contents that are much longer than the new file").unwrap();

        let params = ParamSet::new(vec!["a0".into(), "w".into()], vec![2.0, 1.0]);
        write_params_json(&path, &params).unwrap();

        let back = read_params_json(&path).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["a0", "w"]);
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("fit.json");
        let params = ParamSet::new(vec!["a0".into(), "w".into()], vec![2.0, 1.0]);
        let err = write_params_json(&path, &params).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_IO);
    }
}
