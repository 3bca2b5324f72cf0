//! Header-less CSV bar files, one instrument per file.
//!
//! Rows look like `1993.04.27,00:00,0.7201,0.7265,0.7130,0.7150,2191`
//! (date, time, open, high, low, close, volume). The symbol comes from the
//! file name: `EURUSD D1.csv` holds `EURUSD`.

use super::normalize::{coerce_number, coerce_volume};
use super::provider::{DataError, RawBar};
use crate::domain::AssetClass;
use std::path::{Path, PathBuf};

/// `"data/csv/eurusd D1.csv"` → `"EURUSD"`.
pub fn symbol_from_path(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let head = base.split(' ').next().unwrap_or_default();
    let stem = head.rsplit_once('.').map_or(head, |(stem, _)| stem);
    stem.to_ascii_uppercase()
}

/// `XAU*`/`XAG*` are metals, six-letter symbols are currency pairs.
pub fn infer_asset_class(symbol: &str) -> AssetClass {
    let s = symbol.to_ascii_uppercase();
    if s.starts_with("XAU") || s.starts_with("XAG") {
        AssetClass::Metal
    } else if s.chars().count() == 6 {
        AssetClass::Fx
    } else {
        AssetClass::Other
    }
}

/// Files in `dir` with the given extension (case-insensitive), sorted by path.
pub fn list_bar_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DataError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
        if path.is_file() && matches {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Read every row of a bar file. Fields that do not parse become `None`;
/// dropping unusable rows is left to normalization.
pub fn read_bar_file(path: &Path) -> Result<Vec<RawBar>, DataError> {
    let malformed = |reason: String| DataError::MalformedFile {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| malformed(e.to_string()))?;

    let mut bars = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        if record.len() < 6 {
            return Err(malformed(format!(
                "line {}: expected at least 6 fields, found {}",
                line + 1,
                record.len()
            )));
        }
        let field = |i: usize| record.get(i).unwrap_or_default();
        bars.push(RawBar {
            ts: format!("{} {}", field(0), field(1)),
            open: coerce_number(field(2)),
            high: coerce_number(field(3)),
            low: coerce_number(field(4)),
            close: coerce_number(field(5)),
            adj_close: None,
            volume: coerce_volume(field(6)),
        });
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn symbol_is_taken_before_the_first_space() {
        assert_eq!(symbol_from_path(Path::new("data/csv/EURUSD D1.csv")), "EURUSD");
        assert_eq!(symbol_from_path(Path::new("xauusd.csv")), "XAUUSD");
        assert_eq!(symbol_from_path(Path::new("/tmp/btc.CSV")), "BTC");
        assert_eq!(symbol_from_path(Path::new("gbpusd.txt")), "GBPUSD");
    }

    #[test]
    fn asset_class_inference() {
        assert_eq!(infer_asset_class("XAUUSD"), AssetClass::Metal);
        assert_eq!(infer_asset_class("xagusd"), AssetClass::Metal);
        assert_eq!(infer_asset_class("EURUSD"), AssetClass::Fx);
        assert_eq!(infer_asset_class("BTC"), AssetClass::Other);
    }

    #[test]
    fn reads_headerless_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1993.04.27,00:00,0.7201,0.7265,0.7130,0.7150,2191").unwrap();
        writeln!(file, "1993.04.28,00:00,0.7150,0.7200,0.7100,bad,2000").unwrap();
        let bars = read_bar_file(file.path()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].ts, "1993.04.27 00:00");
        assert_eq!(bars[0].close, Some(0.7150));
        assert_eq!(bars[0].volume, Some(2191));
        assert_eq!(bars[1].close, None);
    }

    #[test]
    fn short_rows_make_the_file_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1993.04.27,00:00,0.7201").unwrap();
        assert!(matches!(
            read_bar_file(file.path()),
            Err(DataError::MalformedFile { .. })
        ));
    }

    #[test]
    fn lists_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("B D1.csv"), "").unwrap();
        std::fs::write(dir.path().join("A D1.CSV"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let files = list_bar_files(dir.path(), "csv").unwrap();
        let names: Vec<String> = files.iter().map(|p| symbol_from_path(p)).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
