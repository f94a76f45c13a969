//! TCGA sample identifier normalization.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

static BARCODE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^TCGA-[A-Z0-9]{2}-[A-Z0-9]{4}").expect("barcode regex"));

static BARCODE_IN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"TCGA-[A-Z0-9-]+").expect("barcode regex"));

static ALIQUOT_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("uuid regex")
});

/// Normalize a TCGA barcode of any granularity to the patient-level
/// `TCGA-XX-YYYY` form. Non-TCGA identifiers pass through unchanged.
pub fn normalize_tcga_id(identifier: &str) -> String {
    if let Some(m) = BARCODE_PREFIX.find(identifier) {
        return m.as_str().to_string();
    }
    if identifier.starts_with("TCGA-") {
        let parts: Vec<&str> = identifier.split('-').collect();
        if parts.len() >= 3 {
            return format!("TCGA-{}-{}", parts[1], parts[2]);
        }
    }
    identifier.to_string()
}

/// Extract a sample identifier from a GDC download file path: an embedded
/// TCGA barcode wins, then an aliquot UUID, then the normalized file stem.
pub fn extract_sample_id(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    if let Some(m) = BARCODE_IN_NAME.find(name) {
        return normalize_tcga_id(m.as_str());
    }
    if let Some(m) = ALIQUOT_UUID.find(name) {
        return m.as_str().to_string();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    normalize_tcga_id(stem)
}
