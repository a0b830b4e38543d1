use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Equipment { action } => commands::equipment::handle(&action, ctx, flags),
        Commands::Inspect(args) => commands::inspect::run(&args, ctx, flags).await,
        Commands::Inspection { action } => commands::inspection::handle(&action, ctx, flags).await,
        Commands::Ticket { action } => commands::ticket::handle(&action, ctx, flags).await,
        Commands::Fleet => commands::fleet::handle(ctx, flags).await,
    }
}
