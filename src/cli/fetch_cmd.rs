use anyhow::{Context, Result};

use crate::cli::output::OutputOptions;
use crate::cli::report_cmd::select_grantees;
use crate::core::config::AppConfig;
use crate::core::mirror::Mirror;
use crate::core::pipeline::{self, RunContext};
use crate::core::remote::S3Store;

/// Sync the local mirror without aggregating or rendering anything.
pub async fn run(grantee_filter: Option<String>, _opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load()?;
    let grantees = select_grantees(&config, grantee_filter.as_deref())?;
    if grantees.is_empty() {
        eprintln!("No grantees configured. Run `curt config init` to create a config.");
        return Ok(());
    }

    let mirror = Mirror::new(&config.settings.mirror_dir);
    for grantee in &grantees {
        mirror
            .ensure_grantee_dir(&grantee.name)
            .with_context(|| format!("creating mirror dir for '{}'", grantee.name))?;
    }

    let store = S3Store::from_env().await;
    let mut ctx = RunContext::new();
    for grantee in &grantees {
        pipeline::sync_grantee(&store, &mirror, grantee, &mut ctx).await;
    }

    for grantee in &grantees {
        let count = ctx.periods.get(&grantee.name).map_or(0, |p| p.len());
        println!("{}: {} period(s) in {}", grantee.name, count, mirror.grantee_dir(&grantee.name).display());
    }

    Ok(())
}
