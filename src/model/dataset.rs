//! Loading a consolidated table into a feature matrix.

use std::path::Path;

use csv::ReaderBuilder;

use super::{ModelError, ModelResult};

/// Numeric feature matrix read from a consolidated CSV: the first column is
/// the sample identifier, every other column a feature.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub sample_ids: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub width: usize,
}

impl Dataset {
    pub fn from_csv(path: &Path) -> ModelResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| ModelError::Data {
                reason: format!("failed to open {}: {e}", path.display()),
            })?;

        let headers = reader
            .headers()
            .map_err(|e| ModelError::Data {
                reason: format!("failed to read header of {}: {e}", path.display()),
            })?
            .clone();
        if headers.len() < 2 {
            return Err(ModelError::Data {
                reason: format!(
                    "{} has no feature columns (header width {})",
                    path.display(),
                    headers.len()
                ),
            });
        }
        let width = headers.len() - 1;

        let mut sample_ids = Vec::new();
        let mut features = Vec::new();

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| ModelError::Data {
                reason: format!("failed to read {} row {}: {e}", path.display(), row_idx + 2),
            })?;

            let mut fields = record.iter();
            let id = fields.next().unwrap_or_default().to_string();

            let mut row = Vec::with_capacity(width);
            for (col, field) in fields.enumerate() {
                let value: f64 = field.trim().parse().map_err(|_| ModelError::Data {
                    reason: format!(
                        "non-numeric value '{}' at {} row {} column '{}'",
                        field,
                        path.display(),
                        row_idx + 2,
                        headers.get(col + 1).unwrap_or("?")
                    ),
                })?;
                row.push(value);
            }

            sample_ids.push(id);
            features.push(row);
        }

        if features.is_empty() {
            return Err(ModelError::Data {
                reason: format!("{} contains no sample rows", path.display()),
            });
        }

        Ok(Self {
            sample_ids,
            features,
            width,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Standardize every column to zero mean and unit variance in place.
    /// Constant columns are centered only.
    pub fn standardize(&mut self) {
        let n = self.features.len() as f64;

        for col in 0..self.width {
            let mean: f64 = self.features.iter().map(|row| row[col]).sum::<f64>() / n;
            let variance: f64 = self
                .features
                .iter()
                .map(|row| (row[col] - mean).powi(2))
                .sum::<f64>()
                / n;
            let std = variance.sqrt();

            for row in &mut self.features {
                row[col] -= mean;
                if std > 1e-12 {
                    row[col] /= std;
                }
            }
        }
    }
}
