//! Joining per-source tables into the consolidated output.

use std::collections::{BTreeSet, HashSet};

use clap::ValueEnum;
use tracing::debug;

use super::table::SampleTable;
use super::{ConsolidateError, ConsolidateResult};

/// How sample IDs missing from some sources are treated. There is no
/// default: the caller must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JoinPolicy {
    /// Keep only sample IDs present in every source.
    Inner,
    /// Keep the union of sample IDs; missing cells are padded with `0`.
    Outer,
}

/// Join labeled source tables on sample ID.
///
/// Output columns are the union of all source value columns, prefixed with
/// their source label (`mirna:hsa-let-7a`), in source order then first
/// appearance. Rows are sorted by sample ID. Values are copied verbatim from
/// the sources.
pub fn merge_sources(
    sources: &[(&str, &SampleTable)],
    policy: JoinPolicy,
) -> ConsolidateResult<SampleTable> {
    for (label, table) in sources {
        if table.is_empty() {
            return Err(ConsolidateError::EmptySource {
                source_label: (*label).to_string(),
            });
        }
    }

    let mut columns = Vec::new();
    let mut seen = HashSet::new();
    for (label, table) in sources {
        for column in table.columns() {
            let prefixed = format!("{label}:{column}");
            if !seen.insert(prefixed.clone()) {
                return Err(ConsolidateError::DuplicateColumn {
                    source_label: (*label).to_string(),
                    column: column.clone(),
                });
            }
            columns.push(prefixed);
        }
    }

    let sample_ids: BTreeSet<String> = match policy {
        JoinPolicy::Inner => sources
            .first()
            .map(|(_, table)| {
                table
                    .sample_ids()
                    .iter()
                    .filter(|id| sources.iter().all(|(_, t)| t.get(id.as_str()).is_some()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default(),
        JoinPolicy::Outer => sources
            .iter()
            .flat_map(|(_, table)| table.sample_ids().iter().cloned())
            .collect(),
    };

    if sample_ids.is_empty() {
        return Err(ConsolidateError::NoOverlap);
    }
    debug!(samples = sample_ids.len(), columns = columns.len(), "merged shape");

    let mut merged = SampleTable::with_columns(columns);
    for id in sample_ids {
        let mut row = Vec::new();
        for (_, table) in sources {
            match table.get(&id) {
                Some(values) => row.extend(values.iter().cloned()),
                None => row.extend(std::iter::repeat("0".to_string()).take(table.n_columns())),
            }
        }
        merged.push_row(id, row)?;
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(ids_and_rows: &[(&str, &[&str])], columns: &[&str]) -> SampleTable {
        let mut t = SampleTable::with_columns(columns.iter().map(|c| c.to_string()).collect());
        for (id, row) in ids_and_rows {
            t.push_row(
                id.to_string(),
                row.iter().map(|v| v.to_string()).collect(),
            )
            .unwrap();
        }
        t
    }

    #[test]
    fn inner_join_keeps_common_ids_only() {
        let a = table(&[("S1", &["1"]), ("S2", &["2"])], &["x"]);
        let b = table(&[("S2", &["20"]), ("S3", &["30"])], &["y"]);

        let merged = merge_sources(&[("mirna", &a), ("rppa", &b)], JoinPolicy::Inner).unwrap();
        assert_eq!(merged.n_samples(), 1);
        assert_eq!(merged.get("S2").unwrap(), &["2", "20"]);
        assert_eq!(merged.columns(), &["mirna:x", "rppa:y"]);
    }

    #[test]
    fn outer_join_pads_with_zero() {
        let a = table(&[("S1", &["1"])], &["x"]);
        let b = table(&[("S2", &["20"])], &["y"]);

        let merged = merge_sources(&[("mirna", &a), ("rppa", &b)], JoinPolicy::Outer).unwrap();
        assert_eq!(merged.n_samples(), 2);
        assert_eq!(merged.get("S1").unwrap(), &["1", "0"]);
        assert_eq!(merged.get("S2").unwrap(), &["0", "20"]);
    }

    #[test]
    fn disjoint_inner_join_is_no_overlap() {
        let a = table(&[("S1", &["1"])], &["x"]);
        let b = table(&[("S2", &["2"])], &["y"]);

        assert!(matches!(
            merge_sources(&[("mirna", &a), ("rppa", &b)], JoinPolicy::Inner),
            Err(ConsolidateError::NoOverlap)
        ));
    }

    #[test]
    fn empty_source_is_fatal() {
        let a = table(&[("S1", &["1"])], &["x"]);
        let empty = SampleTable::with_columns(vec!["y".to_string()]);

        assert!(matches!(
            merge_sources(&[("mirna", &a), ("rppa", &empty)], JoinPolicy::Inner),
            Err(ConsolidateError::EmptySource { source_label: source }) if source == "rppa"
        ));
    }

    #[test]
    fn duplicate_column_within_source_is_fatal() {
        let mut dup = SampleTable::with_columns(vec!["x".to_string(), "x".to_string()]);
        dup.push_row("S1".to_string(), vec!["1".to_string(), "2".to_string()])
            .unwrap();

        assert!(matches!(
            merge_sources(&[("mirna", &dup)], JoinPolicy::Inner),
            Err(ConsolidateError::DuplicateColumn { source_label: source, column })
                if source == "mirna" && column == "x"
        ));
    }

    #[test]
    fn same_column_name_across_sources_is_disambiguated() {
        let a = table(&[("S1", &["1"])], &["x"]);
        let b = table(&[("S1", &["2"])], &["x"]);

        let merged = merge_sources(&[("mirna", &a), ("rppa", &b)], JoinPolicy::Inner).unwrap();
        assert_eq!(merged.columns(), &["mirna:x", "rppa:x"]);
    }

    #[test]
    fn rows_come_out_sorted_by_id() {
        let a = table(&[("S3", &["3"]), ("S1", &["1"]), ("S2", &["2"])], &["x"]);
        let merged = merge_sources(&[("mirna", &a)], JoinPolicy::Inner).unwrap();
        assert_eq!(merged.sample_ids(), &["S1", "S2", "S3"]);
    }
}
