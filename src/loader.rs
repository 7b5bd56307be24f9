// File loading: raw bytes to RawTable.
//
// Encoding and delimiter quirks of the source exports are resolved here so
// nothing downstream ever sees bytes or separators.
use crate::config::PipelineConfig;
use crate::types::RawTable;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use encoding::all::ISO_8859_1;
use encoding::{DecoderTrap, Encoding};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Decode export bytes: UTF-8 when valid, ISO-8859-1 otherwise.
///
/// The exports are nominally ISO-8859-1 but re-saved copies circulate as
/// UTF-8. Latin-1 decoding is total over arbitrary bytes, so the fallback
/// cannot fail on content.
pub fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => ISO_8859_1
            .decode(bytes, DecoderTrap::Replace)
            .unwrap_or_default(),
    }
}

/// Pick the delimiter of a sniffed file from its first non-empty line.
pub fn detect_delimiter(text: &str) -> u8 {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let semicolons = line.matches(';').count();
    let commas = line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Parse decoded CSV text into a [`RawTable`].
///
/// `flexible` keeps ragged rows; the series builders own arity checks.
pub fn parse_csv(text: &str, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(text.as_bytes());
    let mut rows: RawTable = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(rows)
}

/// Load one export file. `delimiter: None` sniffs it from the first line.
pub fn load_table(path: &Path, delimiter: Option<u8>) -> Result<RawTable> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = decode_bytes(&bytes);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&text));
    parse_csv(&text, delimiter)
}

/// The three raw exports of a run plus load diagnostics.
///
/// A source that fails to load contributes an empty table and its label in
/// `failed_sources`; the other sources are unaffected.
#[derive(Debug, Default)]
pub struct SourceTables {
    pub human: RawTable,
    pub canine: RawTable,
    pub vector: RawTable,
    pub failed_sources: Vec<String>,
    pub rows_read: usize,
}

/// Read every configured export, isolating failures per source.
pub fn load_sources(config: &PipelineConfig) -> SourceTables {
    let mut failed_sources = Vec::new();
    let mut rows_read = 0usize;

    let mut load = |label: &str, path: &str, delimiter: Option<u8>| -> RawTable {
        match load_table(Path::new(path), delimiter) {
            Ok(rows) => {
                info!(source = label, rows = rows.len(), "loaded data source");
                rows_read += rows.len();
                rows
            }
            Err(e) => {
                warn!(source = label, error = %e, "data source failed to load");
                failed_sources.push(label.to_string());
                Vec::new()
            }
        }
    };

    // The human export varies in separator between snapshots; the canine
    // and vector files are always semicolon-delimited.
    let human = load("human", &config.human_path, None);
    let canine = load("canine", &config.canine_path, Some(b';'));
    let vector = load("vector", &config.vector_path, Some(b';'));

    SourceTables {
        human,
        canine,
        vector,
        failed_sources,
        rows_read,
    }
}
