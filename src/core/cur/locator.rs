use std::collections::BTreeSet;

use tracing::debug;

use crate::core::config::GranteeConfig;
use crate::core::cur::{Period, ReportKey};
use crate::core::remote::{ObjectStore, RemoteError};

/// Distinct report periods visible under the grantee's S3 prefix.
///
/// Lists every object below `s3_prefix`, keeps the manifest-like JSON
/// keys, and collects their period path segments into an ordered set
/// (insertion is idempotent, so a period is recorded at most once no
/// matter how many manifests reference it). A listing failure is returned
/// to the caller, which treats it as "zero periods for this grantee".
pub async fn discover_periods<S: ObjectStore>(
    store: &S,
    grantee: &GranteeConfig,
) -> Result<BTreeSet<Period>, RemoteError> {
    let keys = store.list(&grantee.s3_bucket, &grantee.s3_prefix).await?;

    let mut periods = BTreeSet::new();
    for key in &keys {
        match ReportKey::parse(key, &grantee.s3_prefix, &grantee.report_name) {
            Some(report_key) if report_key.is_manifest() => {
                debug!(
                    grantee = %grantee.name,
                    period = %report_key.period,
                    assembly = ?report_key.assembly_id,
                    "manifest located"
                );
                periods.insert(report_key.period);
            }
            // Data files, checksums and the like share the layout but do
            // not identify periods on their own.
            Some(_) => {}
            None => {
                debug!(grantee = %grantee.name, key = %key, "ignoring key outside the report layout");
            }
        }
    }
    Ok(periods)
}
