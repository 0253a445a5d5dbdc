use anyhow::{Context, Result};
use tracing::info;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::{AppConfig, GranteeConfig};
use crate::core::mirror::Mirror;
use crate::core::models::cost::GranteeReport;
use crate::core::pipeline::{self, RunContext};
use crate::core::remote::S3Store;

/// Resolve the grantee set for this run: one named grantee, or every
/// configured one in configured order.
pub(crate) fn select_grantees(
    config: &AppConfig,
    filter: Option<&str>,
) -> Result<Vec<GranteeConfig>> {
    match filter {
        Some(name) => match config.grantees.iter().find(|g| g.name == name) {
            Some(g) => Ok(vec![g.clone()]),
            None => anyhow::bail!("unknown grantee: '{name}'"),
        },
        None => Ok(config.grantees.clone()),
    }
}

pub async fn run(
    grantee_filter: Option<String>,
    offline: bool,
    show_all: bool,
    opts: &OutputOptions,
) -> Result<()> {
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

    let mut ctx = RunContext::new();

    if !offline {
        let store = S3Store::from_env().await;
        // One grantee at a time, in configured order. Each owns its own
        // mirror subtree and dataset, so a failure stays contained.
        for grantee in &grantees {
            pipeline::sync_grantee(&store, &mirror, grantee, &mut ctx).await;
        }
    }

    for grantee in &grantees {
        pipeline::load_grantee(&mirror, grantee, &mut ctx);
    }

    let mut reports: Vec<(&GranteeConfig, GranteeReport)> = Vec::new();
    let mut omitted: Vec<&str> = Vec::new();
    for grantee in &grantees {
        match pipeline::report_for(grantee, &ctx) {
            Some(report) => reports.push((grantee, report)),
            None => {
                info!(grantee = %grantee.name, "omitted from output: no data this run");
                omitted.push(&grantee.name);
            }
        }
    }

    match opts.format {
        OutputFormat::Text => {
            let sections: Vec<String> = reports
                .iter()
                .map(|(grantee, report)| {
                    renderer::render_grantee(report, grantee, show_all, opts.use_color)
                })
                .collect();
            if sections.is_empty() {
                eprintln!("No cost data available for any configured grantee.");
            } else {
                println!("{}", sections.join("\n\n"));
            }
        }
        OutputFormat::Json => {
            let payloads: Vec<&GranteeReport> =
                reports.iter().map(|(_, report)| report).collect();
            let json = if opts.pretty {
                serde_json::to_string_pretty(&payloads)?
            } else {
                serde_json::to_string(&payloads)?
            };
            println!("{}", json);

            if !omitted.is_empty() && opts.verbose {
                eprintln!("No data for: {}", omitted.join(", "));
            }
        }
    }

    Ok(())
}
