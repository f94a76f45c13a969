//! GDC download ingestion: classify files by name and pivot each into one
//! wide sample row.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use regex::Regex;
use tracing::{info, warn};

use super::barcode::extract_sample_id;
use super::table::{delimiter_for, SampleFrame, SampleTable};
use super::{ConsolidateError, ConsolidateResult};

/// The three omics sources a download directory can contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Mirna,
    Rppa,
    Cnv,
}

impl SourceKind {
    /// Label used as the provenance prefix in merged column names.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Mirna => "mirna",
            SourceKind::Rppa => "rppa",
            SourceKind::Cnv => "cnv",
        }
    }
}

/// Classify a download file by its name, mirroring the GDC naming scheme.
pub fn classify(file_name: &str) -> Option<SourceKind> {
    let name = file_name.to_lowercase();
    if name.contains("quantification") && name.contains("mirbase21") {
        Some(SourceKind::Mirna)
    } else if name.contains("rppa") {
        Some(SourceKind::Rppa)
    } else if name.contains("seg") {
        Some(SourceKind::Cnv)
    } else {
        None
    }
}

/// Pivot a miRNA quantification file (`miRNA_ID`,
/// `reads_per_million_miRNA_mapped`) into one wide sample row.
pub fn parse_mirna_quant(path: &Path) -> ConsolidateResult<SampleFrame> {
    pivot_two_columns(path, "miRNA_ID", "reads_per_million_miRNA_mapped")
}

/// Pivot an RPPA file (`peptide_target`, `protein_expression`) into one wide
/// sample row.
pub fn parse_rppa(path: &Path) -> ConsolidateResult<SampleFrame> {
    pivot_two_columns(path, "peptide_target", "protein_expression")
}

/// Summarize a segmentation file into per-chromosome mean segment values.
/// Accepts `Segment_Mean` or, failing that, `Copy_Number`.
pub fn parse_segments(path: &Path) -> ConsolidateResult<SampleFrame> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();

    let chrom_pos = position(&headers, "Chromosome", path)?;
    let (value_pos, value_column) = match headers.iter().position(|h| h == "Segment_Mean") {
        Some(pos) => (pos, "Segment_Mean"),
        None => (position(&headers, "Copy_Number", path)?, "Copy_Number"),
    };

    // BTreeMap keeps chromosomes in lexicographic order for stable output.
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let chromosome = record.get(chrom_pos).unwrap_or_default().to_string();
        let raw = record.get(value_pos).unwrap_or_default();
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ConsolidateError::InvalidValue {
                value: raw.to_string(),
                column: value_column.to_string(),
                path: path.to_path_buf(),
            })?;

        let entry = sums.entry(chromosome).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let mut columns = Vec::with_capacity(sums.len());
    let mut values = Vec::with_capacity(sums.len());
    for (chromosome, (sum, count)) in sums {
        columns.push(chromosome);
        values.push((sum / count as f64).to_string());
    }

    Ok(SampleFrame {
        sample_id: extract_sample_id(path),
        columns,
        values,
    })
}

/// Per-source tables assembled from one download directory.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub mirna: SampleTable,
    pub rppa: SampleTable,
    pub cnv: SampleTable,
}

/// Walk a download directory, classify and parse every matching data file,
/// and stack the resulting sample rows per source. Files that fail to parse
/// are logged and skipped.
pub fn collect_sources(dir: &Path, pattern: &str) -> ConsolidateResult<ScanOutcome> {
    let matcher = glob_to_regex(pattern);
    let mut files = Vec::new();
    walk(dir, &mut files)?;

    files.retain(|path| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let data_suffix = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("txt") | Some("tsv") | Some("csv")
        );
        data_suffix && matcher.is_match(name)
    });
    files.sort();

    if files.is_empty() {
        return Err(ConsolidateError::NoFilesMatched {
            pattern: pattern.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    for path in &files {
        info!(path = %path.display(), "matched file");
    }

    let mut outcome = ScanOutcome::default();
    for path in &files {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let Some(kind) = classify(name) else {
            continue;
        };

        let parsed = match kind {
            SourceKind::Mirna => parse_mirna_quant(path),
            SourceKind::Rppa => parse_rppa(path),
            SourceKind::Cnv => parse_segments(path),
        };

        match parsed {
            Ok(frame) => match kind {
                SourceKind::Mirna => outcome.mirna.absorb(frame),
                SourceKind::Rppa => outcome.rppa.absorb(frame),
                SourceKind::Cnv => outcome.cnv.absorb(frame),
            },
            Err(err) => warn!(path = %path.display(), error = %err, "failed to parse, skipping"),
        }
    }

    Ok(outcome)
}

fn pivot_two_columns(path: &Path, key_column: &str, value_column: &str) -> ConsolidateResult<SampleFrame> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();

    let key_pos = position(&headers, key_column, path)?;
    let value_pos = position(&headers, value_column, path)?;

    let mut columns = Vec::new();
    let mut values = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let key = record.get(key_pos).unwrap_or_default().to_string();
        if !seen.insert(key.clone()) {
            warn!(path = %path.display(), column = %key, "duplicate key, keeping first");
            continue;
        }
        columns.push(key);
        values.push(record.get(value_pos).unwrap_or_default().to_string());
    }

    Ok(SampleFrame {
        sample_id: extract_sample_id(path),
        columns,
        values,
    })
}

fn open_reader(path: &Path) -> ConsolidateResult<csv::Reader<fs::File>> {
    ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))
}

fn position(headers: &csv::StringRecord, column: &str, path: &Path) -> ConsolidateResult<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ConsolidateError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
}

fn csv_error(path: &Path, source: csv::Error) -> ConsolidateError {
    ConsolidateError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> ConsolidateResult<()> {
    let entries = fs::read_dir(dir).map_err(|e| ConsolidateError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConsolidateError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else {
            files.push(path);
        }
    }

    Ok(())
}

/// Translate a shell-style glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(pattern: &str) -> Regex {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            _ => expr.push_str(&regex::escape(&ch.to_string())),
        }
    }
    expr.push('$');
    // Escaped input cannot produce an invalid expression.
    Regex::new(&expr).expect("glob regex")
}
