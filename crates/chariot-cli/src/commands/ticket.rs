use chariot_core::enums::TicketStatus;
use chariot_core::ledger::TicketTransition;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TicketCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `chk ticket`.
pub async fn handle(
    action: &TicketCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TicketCommands::List { status, limit } => {
            let status = status
                .as_deref()
                .map(|raw| parse_enum::<TicketStatus>(raw, "status"))
                .transpose()?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            let mut tickets = ctx.service.list_tickets(status).await?;
            tickets.truncate(usize::try_from(limit)?);
            output(&tickets, flags.format)
        }
        TicketCommands::Get { id } => {
            let ticket = ctx.service.get_ticket(id).await?;
            output(&ticket, flags.format)
        }
        TicketCommands::Counts => {
            let counts = ctx.service.ticket_counts().await?;
            output(&counts, flags.format)
        }
        other => {
            let (id, transition) = transition_for(other)?;
            let ticket = ctx.service.update_ticket(id, transition).await?;
            output(&ticket, flags.format)
        }
    }
}

fn transition_for(action: &TicketCommands) -> anyhow::Result<(&str, TicketTransition)> {
    let pair = match action {
        TicketCommands::Start { id, assignee } => (
            id.as_str(),
            TicketTransition::Start {
                assignee: assignee.clone(),
            },
        ),
        TicketCommands::Complete { id, resolution } => (
            id.as_str(),
            TicketTransition::Complete {
                resolution: resolution.clone(),
            },
        ),
        TicketCommands::Cancel { id } => (id.as_str(), TicketTransition::Cancel),
        TicketCommands::Note { id, notes } => (
            id.as_str(),
            TicketTransition::Notes {
                notes: notes.clone(),
            },
        ),
        TicketCommands::List { .. } | TicketCommands::Get { .. } | TicketCommands::Counts => {
            anyhow::bail!("not a ticket transition")
        }
    };
    Ok(pair)
}
