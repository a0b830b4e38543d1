use clap::Subcommand;

/// Maintenance ticket commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TicketCommands {
    /// List tickets, newest first.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Get a ticket by ID.
    Get { id: String },
    /// Take a pending ticket.
    Start {
        id: String,
        /// Defaults to the current operator.
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Close an in-progress ticket.
    Complete {
        id: String,
        #[arg(long)]
        resolution: String,
    },
    /// Cancel an open ticket.
    Cancel { id: String },
    /// Replace a ticket's notes. Omit --notes to clear them.
    Note {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Ticket count per status.
    Counts,
}
