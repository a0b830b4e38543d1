use chariot_core::enums::EquipmentCategory;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::EquipmentCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `chk equipment`.
pub fn handle(
    action: &EquipmentCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        EquipmentCommands::List { category } => {
            let equipment = match category {
                Some(raw) => {
                    let category = parse_enum::<EquipmentCategory>(raw, "category")?;
                    ctx.service.list_equipment_by_category(category)
                }
                None => ctx.service.list_equipment(),
            };
            output(&equipment, flags.format)
        }
        EquipmentCommands::Get { id } => {
            let equipment = ctx.service.select_equipment(id)?;
            output(&equipment, flags.format)
        }
    }
}
