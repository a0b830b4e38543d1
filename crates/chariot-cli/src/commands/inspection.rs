use chariot_db::repos::inspection::InspectionFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::InspectionCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `chk inspection`.
pub async fn handle(
    action: &InspectionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        InspectionCommands::List { equipment, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            let filter = InspectionFilter {
                equipment_id: equipment.clone(),
                limit: Some(usize::try_from(limit)?),
            };
            let inspections = ctx.service.list_inspections(&filter).await?;
            output(&inspections, flags.format)
        }
        InspectionCommands::Get { id } => {
            let inspection = ctx.service.get_inspection(id).await?;
            output(&inspection, flags.format)
        }
    }
}
