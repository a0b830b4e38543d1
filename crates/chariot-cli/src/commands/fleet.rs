use chariot_core::responses::FleetSummary;
use chrono::Local;
use serde::Serialize;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DayTotals {
    date: String,
    inspections_today: usize,
    with_defects_today: usize,
    critical_today: usize,
}

impl From<&FleetSummary> for DayTotals {
    fn from(summary: &FleetSummary) -> Self {
        Self {
            date: summary.date.to_string(),
            inspections_today: summary.inspections_today,
            with_defects_today: summary.with_defects_today,
            critical_today: summary.critical_today,
        }
    }
}

/// Handle `chk fleet`.
///
/// Tables print the day totals and then one row per unit.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let summary = ctx.service.fleet_summary(Local::now()).await?;
    match flags.format {
        OutputFormat::Table => {
            output(&DayTotals::from(&summary), flags.format)?;
            println!();
            output(&summary.equipment, flags.format)
        }
        OutputFormat::Json | OutputFormat::Raw => output(&summary, flags.format),
    }
}
