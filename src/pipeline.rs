use anyhow::Result;
use tracing::{info, instrument};

use crate::{config::Config, process, report::Report};

/// Load the raw CSV, normalize it once, and run the three analyses over the
/// resulting read-only table.
#[instrument(level = "info", skip(config), fields(input = %config.input_path.display()))]
pub fn run(config: &Config) -> Result<Report> {
    let raw = process::load_raw_csv(&config.input_path)?;
    info!(rows = raw.num_rows(), "loaded raw table");

    let normalized = process::normalize_table(&raw, &config.normalize_options())?;

    info!("starting analyze");
    let report = Report::build(&normalized, config.timeline)?;
    info!(
        over_allocated = report.over_allocated.len(),
        ownership_changes = report.ownership_changes.len(),
        multi_owners = report.multi_owners.len(),
        "analyze is done"
    );
    Ok(report)
}
