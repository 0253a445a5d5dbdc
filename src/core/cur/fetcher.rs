use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::GranteeConfig;
use crate::core::cur::manifest::{CurManifest, ManifestError};
use crate::core::cur::Period;
use crate::core::mirror::Mirror;
use crate::core::remote::{ObjectStore, RemoteError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("creating {path}: {source}")]
    Mirror {
        path: String,
        source: std::io::Error,
    },
    #[error("manifest {path} lists no report keys")]
    EmptyManifest { path: String },
}

/// Remote key of a period's manifest:
/// `<prefix>/<report_name>/<period>/<report_name>-Manifest.json`.
fn manifest_key(grantee: &GranteeConfig, period: &Period) -> String {
    let base = format!(
        "{}/{}/{}-Manifest.json",
        grantee.report_name, period, grantee.report_name
    );
    if grantee.s3_prefix.is_empty() {
        base
    } else {
        format!("{}/{}", grantee.s3_prefix.trim_end_matches('/'), base)
    }
}

/// Bring one (grantee, period) up to date in the local mirror: create the
/// period directory, download the manifest, and download the cost file it
/// names to a deterministic local path.
///
/// The manifest is re-downloaded unconditionally: for the in-progress
/// period it changes daily, pointing at a fresh data file. Returns the
/// local path of the downloaded cost file.
pub async fn sync_period<S: ObjectStore>(
    store: &S,
    mirror: &Mirror,
    grantee: &GranteeConfig,
    period: &Period,
) -> Result<PathBuf, FetchError> {
    mirror
        .ensure_period_dir(&grantee.name, period)
        .map_err(|source| FetchError::Mirror {
            path: mirror.period_dir(&grantee.name, period).display().to_string(),
            source,
        })?;

    let manifest_key = manifest_key(grantee, period);
    let manifest_path = mirror.manifest_path(&grantee.name, period, &grantee.report_name);
    info!(grantee = %grantee.name, key = %manifest_key, "downloading manifest");
    store
        .download(&grantee.s3_bucket, &manifest_key, &manifest_path)
        .await?;

    let manifest = CurManifest::load(&manifest_path)?;
    debug!(grantee = %grantee.name, assembly = ?manifest.assembly_id, "manifest parsed");
    // TODO: fetch and concatenate the remaining chunks when a manifest
    // lists more than one report key.
    let data_key = manifest
        .primary_report_key()
        .ok_or_else(|| FetchError::EmptyManifest {
            path: manifest_path.display().to_string(),
        })?;

    let data_path = mirror.data_file_path(&grantee.name, period, &grantee.report_name);
    info!(grantee = %grantee.name, key = %data_key, "downloading cost file");
    store
        .download(&grantee.s3_bucket, data_key, &data_path)
        .await?;

    Ok(data_path)
}
