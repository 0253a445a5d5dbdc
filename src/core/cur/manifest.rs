use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// A CUR manifest: one small JSON document per (report, period) naming the
/// data files that make up the period. The real document carries many more
/// fields; only the ones the pipeline consumes are modeled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurManifest {
    pub report_keys: Vec<String>,
    /// Identifies the assembly pass that produced this period's files;
    /// absent for overwrite-style reports.
    #[serde(default)]
    pub assembly_id: Option<String>,
}

impl CurManifest {
    pub fn load(path: &Path) -> Result<CurManifest, ManifestError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The first report key listed by the manifest, or `None` when the
    /// list is empty. Oversized reports are split into numbered chunks
    /// (`-1.csv.gz`, `-2.csv.gz`, ...); only this first chunk is fetched.
    pub fn primary_report_key(&self) -> Option<&str> {
        self.report_keys.first().map(String::as_str)
    }
}
