use clap::Subcommand;

/// Inspection history commands.
#[derive(Clone, Debug, Subcommand)]
pub enum InspectionCommands {
    /// List inspections, newest first.
    List {
        #[arg(long)]
        equipment: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get an inspection by ID.
    Get { id: String },
}
