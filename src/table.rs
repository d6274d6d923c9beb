use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, info};

use crate::domain::TVError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    OutOfStock,
    LowStock,
}

impl Availability {
    pub fn label(&self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::OutOfStock => "Out of Stock",
            Availability::LowStock => "Low Stock",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Availability {
    type Err = TVError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Available" => Ok(Availability::Available),
            "Out of Stock" => Ok(Availability::OutOfStock),
            "Low Stock" => Ok(Availability::LowStock),
            other => Err(TVError::InvalidRecord(format!(
                "unknown availability \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub availability: Availability,
}

impl Row {
    fn new(
        id: i64,
        brand: &str,
        model: &str,
        category: &str,
        availability: Availability,
    ) -> Self {
        Self {
            id,
            brand: brand.to_string(),
            model: model.to_string(),
            category: category.to_string(),
            availability,
        }
    }
}

/// The built-in catalogue shown when no data file is given.
pub fn fixture_rows() -> Vec<Row> {
    use Availability::*;
    vec![
        Row::new(1, "HP", "15-ay", "Computer", Available),
        Row::new(2, "HP", "pavilion", "Computer", Available),
        Row::new(3, "Dell", "aspirion", "Computer", OutOfStock),
        Row::new(4, "Acer", "nitro", "Computer", Available),
        Row::new(5, "Acer", "nitro", "Computer", LowStock),
        Row::new(6, "Samsung", "Galaxy S23", "Mobile", Available),
        Row::new(7, "Apple", "iPhone 15", "Mobile", Available),
        Row::new(8, "Xiaomi", "Redmi Note 12", "Mobile", OutOfStock),
        Row::new(9, "Apple", "iPad Pro", "Tablet", Available),
        Row::new(10, "Samsung", "Galaxy Tab S9", "Tablet", LowStock),
    ]
}

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

const REQUIRED_COLUMNS: [&str; 5] = ["id", "brand", "model", "category", "availability"];

/// Loads rows from a CSV, Parquet or Arrow file.
pub fn load_rows(path: PathBuf) -> Result<Vec<Row>, TVError> {
    let file_type = check_file(&path)?;
    let start_time = Instant::now();

    let frame = match file_type {
        FileType::CSV => LazyCsvReader::new(PlPath::Local(path.as_path().into()))
            .with_has_header(true)
            .finish()?,
        FileType::PARQUET => LazyFrame::scan_parquet(
            PlPath::Local(path.as_path().into()),
            ScanArgsParquet::default(),
        )?,
        FileType::ARROW => LazyFrame::scan_ipc(
            PlPath::Local(path.as_path().into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )?,
    };
    let df = frame.collect()?;

    let columns = REQUIRED_COLUMNS
        .iter()
        .map(|name| string_column(&df, name))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = rows_from_columns(&columns)?;

    info!(
        "Loaded {} rows from {:?} in {}ms",
        rows.len(),
        path,
        start_time.elapsed().as_millis()
    );
    Ok(rows)
}

fn check_file(path: &Path) -> Result<FileType, TVError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TVError::FileNotFound,
        ErrorKind::PermissionDenied => TVError::PermissionDenied,
        _ => TVError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TVError::LoadingFailed("Not a file!".into()));
    }
    debug!("Data file {:?}, {} bytes", path, metadata.len());
    detect_file_type(path)
}

fn detect_file_type(path: &Path) -> Result<FileType, TVError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(TVError::UnknownFileType),
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, TVError> {
    let column = df
        .column(name)
        .map_err(|_| TVError::LoadingFailed(format!("missing column \"{name}\"")))?
        .cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(values)
}

fn rows_from_columns(columns: &[Vec<String>]) -> Result<Vec<Row>, TVError> {
    let [ids, brands, models, categories, availabilities] = columns else {
        return Err(TVError::LoadingFailed("unexpected column layout".into()));
    };

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(ids.len());
    for (idx, raw_id) in ids.iter().enumerate() {
        let id: i64 = raw_id
            .trim()
            .parse()
            .map_err(|_| TVError::InvalidRecord(format!("row {idx}: bad id \"{raw_id}\"")))?;
        if !seen.insert(id) {
            return Err(TVError::InvalidRecord(format!("row {idx}: duplicate id {id}")));
        }
        rows.push(Row {
            id,
            brand: brands[idx].clone(),
            model: models[idx].clone(),
            category: categories[idx].clone(),
            availability: availabilities[idx].parse()?,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(rows: &[[&str; 5]]) -> Vec<Vec<String>> {
        (0..5)
            .map(|c| rows.iter().map(|r| r[c].to_string()).collect())
            .collect()
    }

    #[test]
    fn fixture_ids_are_unique_and_ordered() {
        let ids: Vec<i64> = fixture_rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn availability_labels_round_trip() {
        for a in [
            Availability::Available,
            Availability::OutOfStock,
            Availability::LowStock,
        ] {
            assert_eq!(a.label().parse::<Availability>().ok(), Some(a));
        }
        assert!("Sold".parse::<Availability>().is_err());
    }

    #[test]
    fn detects_file_types() {
        assert_eq!(
            detect_file_type(Path::new("a/b.csv")).ok(),
            Some(FileType::CSV)
        );
        assert_eq!(
            detect_file_type(Path::new("b.PQ")).ok(),
            Some(FileType::PARQUET)
        );
        assert_eq!(
            detect_file_type(Path::new("b.feather")).ok(),
            Some(FileType::ARROW)
        );
        assert!(matches!(
            detect_file_type(Path::new("b.txt")),
            Err(TVError::UnknownFileType)
        ));
    }

    #[test]
    fn builds_rows_from_columns() {
        let rows = rows_from_columns(&columns(&[
            ["7", "Apple", "iPhone 15", "Mobile", "Available"],
            ["3", "Dell", "aspirion", "Computer", "Out of Stock"],
        ]))
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, 3);
        assert_eq!(rows[1].availability, Availability::OutOfStock);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = rows_from_columns(&columns(&[
            ["1", "HP", "15-ay", "Computer", "Available"],
            ["1", "HP", "pavilion", "Computer", "Available"],
        ]));
        assert!(matches!(result, Err(TVError::InvalidRecord(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_rows(PathBuf::from("does/not/exist.csv"));
        assert!(matches!(result, Err(TVError::FileNotFound)));
    }
}
