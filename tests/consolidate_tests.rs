//! Integration tests for the consolidation pipeline.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crc_qvae::consolidate::{
    collect_sources, merge_sources, ConsolidateError, JoinPolicy, SampleTable,
};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn three_sources(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let mirna = write_file(dir, "mirna.csv", "sample_id,hsa-let-7a\nS1,1.5\nS2,2.5\nS3,3.5\n");
    let rppa = write_file(dir, "rppa.csv", "sample_id,AKT\nS1,0.10\nS2,0.20\nS3,0.30\n");
    let cnv = write_file(dir, "cnv.csv", "sample_id,chr1\nS1,-0.5\nS2,0.0\nS3,0.5\n");
    (mirna, rppa, cnv)
}

fn load(path: &Path) -> SampleTable {
    SampleTable::read_csv(path, "sample_id").unwrap()
}

#[test]
fn end_to_end_three_sources() {
    let dir = tempfile::tempdir().unwrap();
    let (mirna, rppa, cnv) = three_sources(dir.path());

    let mirna = load(&mirna);
    let rppa = load(&rppa);
    let cnv = load(&cnv);

    let merged = merge_sources(
        &[("mirna", &mirna), ("rppa", &rppa), ("cnv", &cnv)],
        JoinPolicy::Inner,
    )
    .unwrap();

    // 3 samples, identifier + 3 value columns.
    assert_eq!(merged.n_samples(), 3);
    assert_eq!(merged.n_columns(), 3);
    assert_eq!(
        merged.columns(),
        &["mirna:hsa-let-7a", "rppa:AKT", "cnv:chr1"]
    );

    let out = dir.path().join("crc_consolidated.csv");
    merged.write_csv(&out, "sample_id").unwrap();

    let written = fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next().unwrap(),
        "sample_id,mirna:hsa-let-7a,rppa:AKT,cnv:chr1"
    );
    // Values are byte-identical copies of the inputs ("0.10" keeps its zero).
    assert_eq!(lines.next().unwrap(), "S1,1.5,0.10,-0.5");
    assert_eq!(lines.next().unwrap(), "S2,2.5,0.20,0.0");
    assert_eq!(lines.next().unwrap(), "S3,3.5,0.30,0.5");
    assert_eq!(lines.next(), None);
}

#[test]
fn inner_join_row_count_is_the_intersection() {
    let dir = tempfile::tempdir().unwrap();
    let mirna = write_file(dir.path(), "m.csv", "sample_id,v\nS1,1\nS2,2\nS3,3\n");
    let rppa = write_file(dir.path(), "r.csv", "sample_id,w\nS2,4\nS3,5\nS4,6\n");
    let cnv = write_file(dir.path(), "c.csv", "sample_id,u\nS3,7\nS4,8\nS5,9\n");

    let merged = merge_sources(
        &[
            ("mirna", &load(&mirna)),
            ("rppa", &load(&rppa)),
            ("cnv", &load(&cnv)),
        ],
        JoinPolicy::Inner,
    )
    .unwrap();

    assert_eq!(merged.n_samples(), 1);
    assert_eq!(merged.get("S3").unwrap(), &["3", "5", "7"]);
}

#[test]
fn outer_join_keeps_union_with_zero_padding() {
    let dir = tempfile::tempdir().unwrap();
    let mirna = write_file(dir.path(), "m.csv", "sample_id,v\nS1,1\n");
    let rppa = write_file(dir.path(), "r.csv", "sample_id,w\nS2,4\n");
    let cnv = write_file(dir.path(), "c.csv", "sample_id,u\nS1,7\nS2,8\n");

    let merged = merge_sources(
        &[
            ("mirna", &load(&mirna)),
            ("rppa", &load(&rppa)),
            ("cnv", &load(&cnv)),
        ],
        JoinPolicy::Outer,
    )
    .unwrap();

    assert_eq!(merged.n_samples(), 2);
    assert_eq!(merged.get("S1").unwrap(), &["1", "0", "7"]);
    assert_eq!(merged.get("S2").unwrap(), &["0", "4", "8"]);
}

#[test]
fn disjoint_sources_raise_no_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let mirna = write_file(dir.path(), "m.csv", "sample_id,v\nS1,1\n");
    let rppa = write_file(dir.path(), "r.csv", "sample_id,w\nS2,2\n");
    let cnv = write_file(dir.path(), "c.csv", "sample_id,u\nS3,3\n");

    let result = merge_sources(
        &[
            ("mirna", &load(&mirna)),
            ("rppa", &load(&rppa)),
            ("cnv", &load(&cnv)),
        ],
        JoinPolicy::Inner,
    );
    assert!(matches!(result, Err(ConsolidateError::NoOverlap)));
}

#[test]
fn missing_identifier_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_file(dir.path(), "bad.csv", "patient,v\nS1,1\n");

    assert!(matches!(
        SampleTable::read_csv(&bad, "sample_id"),
        Err(ConsolidateError::MissingColumn { column, .. }) if column == "sample_id"
    ));
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let (mirna, rppa, cnv) = three_sources(dir.path());

    let mut outputs = Vec::new();
    for run in 0..2 {
        let merged = merge_sources(
            &[
                ("mirna", &load(&mirna)),
                ("rppa", &load(&rppa)),
                ("cnv", &load(&cnv)),
            ],
            JoinPolicy::Inner,
        )
        .unwrap();
        let out = dir.path().join(format!("out_{run}.csv"));
        merged.write_csv(&out, "sample_id").unwrap();
        outputs.push(fs::read(&out).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn scan_mode_end_to_end() {
    let dir = tempfile::tempdir().unwrap();

    for sample in ["TCGA-A6-2671", "TCGA-AA-3525"] {
        write_file(
            dir.path(),
            &format!("{sample}.mirbase21.mirnas.quantification.txt"),
            "miRNA_ID\treads_per_million_miRNA_mapped\nhsa-let-7a\t10.5\nhsa-mir-21\t2.25\n",
        );
        write_file(
            dir.path(),
            &format!("{sample}.RPPA.tsv"),
            "peptide_target\tprotein_expression\nAKT\t0.9\n",
        );
        write_file(
            dir.path(),
            &format!("{sample}.grch38.seg.txt"),
            "Chromosome\tStart\tEnd\tSegment_Mean\n1\t0\t10\t0.5\n1\t10\t20\t1.5\n2\t0\t10\t-1.0\n",
        );
    }

    let outcome = collect_sources(dir.path(), "*").unwrap();
    let merged = merge_sources(
        &[
            ("mirna", &outcome.mirna),
            ("rppa", &outcome.rppa),
            ("cnv", &outcome.cnv),
        ],
        JoinPolicy::Inner,
    )
    .unwrap();

    assert_eq!(merged.n_samples(), 2);
    assert_eq!(
        merged.columns(),
        &[
            "mirna:hsa-let-7a",
            "mirna:hsa-mir-21",
            "rppa:AKT",
            "cnv:1",
            "cnv:2"
        ]
    );
    // Sorted by barcode; segment means averaged per chromosome.
    assert_eq!(merged.sample_ids(), &["TCGA-A6-2671", "TCGA-AA-3525"]);
    assert_eq!(
        merged.get("TCGA-A6-2671").unwrap(),
        &["10.5", "2.25", "0.9", "1", "-1"]
    );
}

#[test]
fn barcode_normalization_aligns_sources() {
    let dir = tempfile::tempdir().unwrap();
    // Same patient, different barcode granularity per source.
    let mirna = write_file(
        dir.path(),
        "m.csv",
        "sample_id,v\nTCGA-A6-2671-01A-01T-1410-13,1\n",
    );
    let rppa = write_file(dir.path(), "r.csv", "sample_id,w\nTCGA-A6-2671-01A,2\n");
    let cnv = write_file(dir.path(), "c.csv", "sample_id,u\nTCGA-A6-2671,3\n");

    let mut tables = [load(&mirna), load(&rppa), load(&cnv)];
    for table in &mut tables {
        table.normalize_sample_ids();
    }

    let merged = merge_sources(
        &[
            ("mirna", &tables[0]),
            ("rppa", &tables[1]),
            ("cnv", &tables[2]),
        ],
        JoinPolicy::Inner,
    )
    .unwrap();

    assert_eq!(merged.n_samples(), 1);
    assert_eq!(merged.get("TCGA-A6-2671").unwrap(), &["1", "2", "3"]);
}
