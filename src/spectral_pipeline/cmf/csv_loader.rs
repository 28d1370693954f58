//! CMF loading from comma-delimited text.
//!
//! Each record is `wavelength, x̄, ȳ, z̄`. There is no header row; blank lines
//! and lines starting with `#` are ignored.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::spectral_pipeline::cmf::types::{CmfRow, CmfTable};
use crate::spectral_pipeline::common::error::{Result, SpectralError};

const CMF_COLUMNS: usize = 4;

/// Loads a CMF table from a CSV file on disk.
pub fn load_cmf_csv<P: AsRef<Path>>(path: P) -> Result<CmfTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| SpectralError::InputReadError(format!("{}: {}", path.display(), e)))?;
    let table = parse_cmf_csv(file)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        "Loaded color matching functions"
    );
    Ok(table)
}

/// Parses CMF records from any reader, enforcing column count and strictly
/// increasing wavelengths.
pub fn parse_cmf_csv<R: Read>(reader: R) -> Result<CmfTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut rows: Vec<CmfRow> = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| SpectralError::MalformedCmf {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != CMF_COLUMNS {
            return Err(SpectralError::MalformedCmf {
                line,
                reason: format!("expected {} columns, found {}", CMF_COLUMNS, record.len()),
            });
        }

        let mut values = [0.0f64; CMF_COLUMNS];
        for (value, field) in values.iter_mut().zip(record.iter()) {
            *value = field.parse::<f64>().map_err(|_| SpectralError::MalformedCmf {
                line,
                reason: format!("'{}' is not a number", field),
            })?;
            if !value.is_finite() {
                return Err(SpectralError::MalformedCmf {
                    line,
                    reason: format!("'{}' is not finite", field),
                });
            }
        }

        if let Some(previous) = rows.last() {
            if values[0] == previous.wavelength {
                return Err(SpectralError::DuplicateWavelength(values[0]));
            }
            if values[0] < previous.wavelength {
                return Err(SpectralError::NonMonotonicCmf {
                    line,
                    previous: previous.wavelength,
                    current: values[0],
                });
            }
        }

        rows.push(CmfRow {
            wavelength: values[0],
            weights: [values[1], values[2], values[3]],
        });
    }

    debug!("Parsed {} CMF rows", rows.len());
    Ok(CmfTable::from_sorted_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_well_formed_table() {
        let text = "390,3.769647e-03,4.146161e-04,1.847260e-02\n\
                    391, 4.532416e-03, 5.028333e-04, 2.221101e-02\n\
                    \n\
                    392,5.446553e-03,6.084991e-04,2.669819e-02\n";
        let table = parse_cmf_csv(text.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.wavelengths(), vec![390.0, 391.0, 392.0]);
        assert_eq!(table.rows()[1].weights[0], 4.532416e-03);
    }

    #[test]
    fn test_wrong_column_count() {
        let text = "390,1,2,3\n391,1,2\n";
        let err = parse_cmf_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, SpectralError::MalformedCmf { line: 2, .. }));
    }

    #[test]
    fn test_non_numeric_field() {
        let text = "lambda,x,y,z\n390,1,2,3\n";
        let err = parse_cmf_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, SpectralError::MalformedCmf { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_wavelength() {
        let text = "390,1,2,3\n390,1,2,3\n";
        let err = parse_cmf_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, SpectralError::DuplicateWavelength(w) if w == 390.0));
    }

    #[test]
    fn test_decreasing_wavelength() {
        let text = "400,1,2,3\n390,1,2,3\n";
        let err = parse_cmf_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SpectralError::NonMonotonicCmf { line: 2, previous, current } if previous == 400.0 && current == 390.0
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "400,0.1,0.2,0.3").unwrap();
        writeln!(file, "410,0.4,0.5,0.6").unwrap();

        let table = load_cmf_csv(file.path()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_cmf_csv(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, SpectralError::InputReadError(_)));
    }
}
