//! Sample-keyed tables with string cells.
//!
//! Cells stay strings end to end: a value that survives the merge is a
//! byte-identical copy of the source text, never a parse-and-reformat.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::warn;

use super::{ConsolidateError, ConsolidateResult};

/// One sample parsed out of a single source file: an identifier plus aligned
/// column names and values.
#[derive(Debug, Clone)]
pub struct SampleFrame {
    pub sample_id: String,
    pub columns: Vec<String>,
    pub values: Vec<String>,
}

/// A table of samples: ordered value columns, one row per sample ID.
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    sample_ids: Vec<String>,
    row_index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl SampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(columns: Vec<String>) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            column_index,
            ..Self::default()
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, sample_id: &str) -> Option<&[String]> {
        self.row_index
            .get(sample_id)
            .map(|&i| self.rows[i].as_slice())
    }

    /// Append one row. Duplicate sample IDs keep the first occurrence;
    /// returns whether the row was inserted.
    pub fn push_row(&mut self, sample_id: String, values: Vec<String>) -> ConsolidateResult<bool> {
        if values.len() != self.columns.len() {
            return Err(ConsolidateError::RowWidth {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        if self.row_index.contains_key(&sample_id) {
            warn!(%sample_id, "duplicate sample id, keeping first occurrence");
            return Ok(false);
        }

        self.row_index.insert(sample_id.clone(), self.rows.len());
        self.sample_ids.push(sample_id);
        self.rows.push(values);
        Ok(true)
    }

    /// Merge a single-sample frame into the table, extending the column set
    /// as needed. Cells absent from a row are padded with `0`.
    pub fn absorb(&mut self, frame: SampleFrame) {
        for column in &frame.columns {
            if !self.column_index.contains_key(column) {
                self.column_index.insert(column.clone(), self.columns.len());
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push("0".to_string());
                }
            }
        }

        if self.row_index.contains_key(&frame.sample_id) {
            warn!(
                sample_id = %frame.sample_id,
                "duplicate sample id, keeping first occurrence"
            );
            return;
        }

        let mut row = vec!["0".to_string(); self.columns.len()];
        for (column, value) in frame.columns.iter().zip(frame.values) {
            row[self.column_index[column]] = value;
        }

        self.row_index
            .insert(frame.sample_id.clone(), self.rows.len());
        self.sample_ids.push(frame.sample_id);
        self.rows.push(row);
    }

    /// Normalize every sample ID to patient-level TCGA form. IDs that
    /// collide after normalization keep the first row.
    pub fn normalize_sample_ids(&mut self) {
        let mut sample_ids = Vec::new();
        let mut row_index = HashMap::new();
        let mut rows = Vec::new();

        for (id, row) in self.sample_ids.iter().zip(self.rows.iter()) {
            let normalized = super::barcode::normalize_tcga_id(id);
            if row_index.contains_key(&normalized) {
                warn!(sample_id = %normalized, "duplicate sample id after normalization, keeping first");
                continue;
            }
            row_index.insert(normalized.clone(), rows.len());
            sample_ids.push(normalized);
            rows.push(row.clone());
        }

        self.sample_ids = sample_ids;
        self.row_index = row_index;
        self.rows = rows;
    }

    /// Sort rows lexicographically by sample ID. Reruns over unchanged
    /// inputs then serialize byte-identically regardless of insertion order.
    pub fn sort_by_sample_id(&mut self) {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| self.sample_ids[a].cmp(&self.sample_ids[b]));

        self.sample_ids = order.iter().map(|&i| self.sample_ids[i].clone()).collect();
        self.rows = order.iter().map(|&i| self.rows[i].clone()).collect();
        self.row_index = self
            .sample_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
    }

    /// Read a sample-keyed table. The delimiter follows the extension
    /// (`,` for `.csv`, tab otherwise); `id_column` names the identifier
    /// column, all other columns are value columns.
    pub fn read_csv(path: &Path, id_column: &str) -> ConsolidateResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter_for(path))
            .has_headers(true)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
        let id_pos = headers
            .iter()
            .position(|h| h == id_column)
            .ok_or_else(|| ConsolidateError::MissingColumn {
                column: id_column.to_string(),
                path: path.to_path_buf(),
            })?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != id_pos)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut table = Self::with_columns(columns);
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(path, e))?;
            let sample_id = record.get(id_pos).unwrap_or_default().to_string();
            let values: Vec<String> = record
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != id_pos)
                .map(|(_, v)| v.to_string())
                .collect();
            table.push_row(sample_id, values)?;
        }

        Ok(table)
    }

    /// Write the table as comma-separated text with `id_header` leading.
    pub fn write_csv(&self, path: &Path, id_header: &str) -> ConsolidateResult<()> {
        let mut writer = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push(id_header.to_string());
        header.extend(self.columns.iter().cloned());
        writer
            .write_record(&header)
            .map_err(|e| csv_error(path, e))?;

        for (id, row) in self.sample_ids.iter().zip(self.rows.iter()) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(id.as_str());
            record.extend(row.iter().map(String::as_str));
            writer
                .write_record(&record)
                .map_err(|e| csv_error(path, e))?;
        }

        writer.flush().map_err(|e| ConsolidateError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

/// Comma for `.csv`, tab for everything else the GDC ships.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

fn csv_error(path: &Path, source: csv::Error) -> ConsolidateError {
    ConsolidateError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
