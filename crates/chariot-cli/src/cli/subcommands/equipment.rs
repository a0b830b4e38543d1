use clap::Subcommand;

/// Equipment catalog commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EquipmentCommands {
    /// List equipment, optionally for one category.
    List {
        /// tier-1, tier-2 or tier-3
        #[arg(long)]
        category: Option<String>,
    },
    /// Get one unit by ID.
    Get { id: String },
}
