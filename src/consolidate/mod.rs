//! Consolidation of per-source omics tables into one sample-keyed CSV.
//!
//! Three sources are supported: miRNA expression, RPPA protein values, and
//! copy-number variation. Each is either read directly as a sample-keyed
//! table or assembled from a GDC download directory, then the three are
//! joined on sample identifier and written out once.

pub mod barcode;
pub mod merge;
pub mod sources;
pub mod table;

pub use merge::{merge_sources, JoinPolicy};
pub use sources::{collect_sources, ScanOutcome, SourceKind};
pub use table::{SampleFrame, SampleTable};

use std::path::PathBuf;

use thiserror::Error;

pub type ConsolidateResult<T> = std::result::Result<T, ConsolidateError>;

#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error("missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("join produced zero overlapping samples")]
    NoOverlap,

    #[error("source '{source_label}' contributed no sample rows")]
    EmptySource { source_label: String },

    #[error("duplicate column '{column}' in source '{source_label}'")]
    DuplicateColumn { source_label: String, column: String },

    #[error("no files matched pattern '{pattern}' in {dir}")]
    NoFilesMatched { pattern: String, dir: PathBuf },

    #[error("invalid numeric value '{value}' in column '{column}' of {path}")]
    InvalidValue {
        value: String,
        column: String,
        path: PathBuf,
    },

    #[error("row width mismatch: expected {expected} values, got {actual}")]
    RowWidth { expected: usize, actual: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
