use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::core::mirror::Mirror;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("{path} is missing required column {column}")]
    MissingColumn { path: String, column: &'static str },
}

/// One CUR row. The source files carry a few hundred columns; only the
/// cost amount and the usage window timestamps are consumed, mapped by
/// their CUR header names.
#[derive(Debug, Clone, Deserialize)]
pub struct CostRecord {
    #[serde(rename = "lineItem/BlendedCost")]
    pub blended_cost: f64,
    #[serde(rename = "lineItem/UsageStartDate")]
    pub usage_start: String,
    #[serde(rename = "lineItem/UsageEndDate")]
    pub usage_end: String,
}

const REQUIRED_COLUMNS: [&str; 3] = [
    "lineItem/BlendedCost",
    "lineItem/UsageStartDate",
    "lineItem/UsageEndDate",
];

/// Row-wise concatenation of every cost file found for a grantee. Rows
/// carry no primary key and overlapping periods are not deduplicated.
#[derive(Debug, Clone, Default)]
pub struct GranteeDataset {
    pub records: Vec<CostRecord>,
}

impl GranteeDataset {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}

/// Result of scanning a grantee's mirror subtree.
#[derive(Debug)]
pub enum BuildOutcome {
    Loaded(GranteeDataset),
    /// No compressed cost files were present. An absence, not a failure.
    NoData,
}

/// Load and concatenate every compressed cost file under the grantee's
/// mirror subtree. A file that fails to decode is logged and excluded;
/// the remaining files still contribute. Row order carries no meaning.
pub fn build_dataset(mirror: &Mirror, grantee: &str) -> BuildOutcome {
    let files = mirror.compressed_files(grantee);
    if files.is_empty() {
        return BuildOutcome::NoData;
    }

    let mut dataset = GranteeDataset::default();
    for path in &files {
        match read_cost_file(path) {
            Ok(mut records) => dataset.records.append(&mut records),
            Err(err) => warn!(grantee = %grantee, "skipping cost file: {err}"),
        }
    }
    BuildOutcome::Loaded(dataset)
}

/// Decode one gzip-compressed CUR CSV. Rows that fail to parse are
/// skipped and counted; the file is only rejected outright when it cannot
/// be opened, decompressed, or is missing a required column.
pub fn read_cost_file(path: &Path) -> Result<Vec<CostRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(GzDecoder::new(file));

    let headers = reader
        .headers()
        .map_err(|source| DatasetError::Csv {
            path: path.display().to_string(),
            source,
        })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn {
                path: path.display().to_string(),
                column,
            });
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<CostRecord>() {
        match row {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped unparseable rows");
    }
    Ok(records)
}
