use std::io;
use std::path::{Path, PathBuf};

use crate::core::cur::Period;

/// Local mirror of downloaded CUR files, laid out as
/// `<root>/<grantee>/<period>/`. The mirror is the only durable artifact
/// the pipeline produces; a missing or empty subtree yields empty results,
/// never corruption.
#[derive(Debug, Clone)]
pub struct Mirror {
    root: PathBuf,
}

impl Mirror {
    pub fn new(root: impl Into<PathBuf>) -> Mirror {
        Mirror { root: root.into() }
    }

    pub fn grantee_dir(&self, grantee: &str) -> PathBuf {
        self.root.join(grantee)
    }

    pub fn ensure_grantee_dir(&self, grantee: &str) -> io::Result<PathBuf> {
        let dir = self.grantee_dir(grantee);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn period_dir(&self, grantee: &str, period: &Period) -> PathBuf {
        self.grantee_dir(grantee).join(period.to_string())
    }

    pub fn ensure_period_dir(&self, grantee: &str, period: &Period) -> io::Result<PathBuf> {
        let dir = self.period_dir(grantee, period);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn manifest_path(&self, grantee: &str, period: &Period, report_name: &str) -> PathBuf {
        self.period_dir(grantee, period)
            .join(format!("{report_name}-Manifest.json"))
    }

    /// Deterministic local name for a period's cost file, independent of
    /// the assembly-id path segment the remote key carries.
    pub fn data_file_path(&self, grantee: &str, period: &Period, report_name: &str) -> PathBuf {
        self.period_dir(grantee, period)
            .join(format!("{report_name}-1.csv.gz"))
    }

    /// Every compressed cost file under the grantee's subtree, any period
    /// directory deep, in path order.
    pub fn compressed_files(&self, grantee: &str) -> Vec<PathBuf> {
        let mut files = Vec::new();
        collect_gz_recursive(&self.grantee_dir(grantee), &mut files, 3);
        files.sort();
        files
    }
}

/// Recursively collect *.csv.gz files up to `max_depth` levels deep.
fn collect_gz_recursive(dir: &Path, files: &mut Vec<PathBuf>, max_depth: u32) {
    if max_depth == 0 {
        return;
    }
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_gz = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(".csv.gz"));
        if path.is_file() && is_gz {
            files.push(path);
        } else if path.is_dir() {
            collect_gz_recursive(&path, files, max_depth - 1);
        }
    }
}
