use std::collections::{BTreeMap, BTreeSet};

use tracing::{error, info};

use crate::core::aggregate;
use crate::core::config::GranteeConfig;
use crate::core::cur::{fetcher, locator, Period};
use crate::core::dataset::{self, BuildOutcome, GranteeDataset};
use crate::core::mirror::Mirror;
use crate::core::models::cost::GranteeReport;
use crate::core::remote::ObjectStore;

/// Per-run state: discovered periods and loaded datasets, keyed by
/// grantee name. Owned by the command layer and handed through the
/// stages; nothing in here outlives the run.
#[derive(Debug, Default)]
pub struct RunContext {
    pub periods: BTreeMap<String, BTreeSet<Period>>,
    pub datasets: BTreeMap<String, GranteeDataset>,
}

impl RunContext {
    pub fn new() -> RunContext {
        RunContext::default()
    }
}

/// Discover and download everything for one grantee. Failures never
/// escape: an unreachable bucket costs that grantee its periods, a failed
/// download costs only that period. Other grantees are untouched.
pub async fn sync_grantee<S: ObjectStore>(
    store: &S,
    mirror: &Mirror,
    grantee: &GranteeConfig,
    ctx: &mut RunContext,
) {
    let periods = match locator::discover_periods(store, grantee).await {
        Ok(periods) => periods,
        Err(err) if err.is_access() => {
            error!(grantee = %grantee.name, "bucket unreachable, skipping grantee: {err}");
            BTreeSet::new()
        }
        Err(err) => {
            error!(grantee = %grantee.name, "period discovery failed: {err}");
            BTreeSet::new()
        }
    };

    for period in &periods {
        if let Err(err) = fetcher::sync_period(store, mirror, grantee, period).await {
            error!(grantee = %grantee.name, period = %period, "period sync failed: {err}");
        }
    }

    ctx.periods
        .entry(grantee.name.clone())
        .or_default()
        .extend(periods);
}

/// Build the grantee's dataset from whatever the mirror holds. An empty
/// subtree is recorded as an absence; the grantee simply stays out of
/// this run's aggregate output.
pub fn load_grantee(mirror: &Mirror, grantee: &GranteeConfig, ctx: &mut RunContext) {
    match dataset::build_dataset(mirror, &grantee.name) {
        BuildOutcome::Loaded(dataset) => {
            info!(grantee = %grantee.name, rows = dataset.row_count(), "dataset loaded");
            ctx.datasets.insert(grantee.name.clone(), dataset);
        }
        BuildOutcome::NoData => {
            info!(grantee = %grantee.name, "no local cost files; grantee will be omitted");
        }
    }
}

/// Aggregate views for one grantee, or `None` when no dataset was loaded
/// this run (the absence was already reported at load time).
pub fn report_for(grantee: &GranteeConfig, ctx: &RunContext) -> Option<GranteeReport> {
    let dataset = ctx.datasets.get(&grantee.name)?;
    let total = aggregate::total_cost(&grantee.name, dataset);
    let budget = aggregate::budget_view(&grantee.name, grantee.grant_amount, &total);
    let daily = aggregate::daily_costs(&grantee.name, dataset);
    let monthly = aggregate::monthly_costs(&grantee.name, dataset);
    Some(GranteeReport {
        grantee: grantee.name.clone(),
        row_count: dataset.row_count(),
        total,
        budget,
        daily,
        monthly,
    })
}
