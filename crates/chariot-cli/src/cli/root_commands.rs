use clap::{Args, Subcommand};

use crate::cli::subcommands::{EquipmentCommands, InspectionCommands, TicketCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Fleet catalog.
    Equipment {
        #[command(subcommand)]
        action: EquipmentCommands,
    },
    /// Run a pre-shift inspection interactively.
    Inspect(InspectArgs),
    /// Completed inspections.
    Inspection {
        #[command(subcommand)]
        action: InspectionCommands,
    },
    /// Maintenance tickets.
    Ticket {
        #[command(subcommand)]
        action: TicketCommands,
    },
    /// Today's supervisor overview.
    Fleet,
}

#[derive(Clone, Debug, Args)]
pub struct InspectArgs {
    /// Equipment to inspect.
    pub equipment_id: String,
    /// Skip the same-day confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
    /// Fixed seed for the question draw.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of questions to draw.
    #[arg(long)]
    pub count: Option<usize>,
}
