// Loading reference ids from a newline-delimited seed list

use crate::catalog::{BatchInsert, CatalogStore};
use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::info;

/// Parse one line of a seed list. Blank lines and `#` comments yield `None`.
pub fn parse_id_line(line: &str) -> Option<String> {
    let id = line.trim();
    if id.is_empty() || id.starts_with('#') {
        return None;
    }
    Some(id.to_string())
}

pub fn parse_ids(content: &str) -> Vec<String> {
    content.lines().filter_map(parse_id_line).collect()
}

pub fn load_ids_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let ids = parse_ids(&content);
    info!("Loaded {} reference ids from {}", ids.len(), path.display());
    Ok(ids)
}

/// Insert a seed list into the catalog, skipping ids already present.
pub fn seed_catalog<S: CatalogStore + ?Sized>(catalog: &S, ids: &[String]) -> Result<BatchInsert> {
    let report = catalog.insert_batch(ids)?;
    info!(
        "Seeded catalog: {} inserted, {} duplicates",
        report.inserted,
        report.duplicates.len()
    );
    Ok(report)
}
