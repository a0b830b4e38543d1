use std::io::{BufRead, Write};

use anyhow::bail;
use chariot_core::entities::AnswerChoice;
use chariot_core::responses::InspectionCompletion;
use chariot_core::session::InspectionSession;
use chariot_db::error::CompletionError;
use chariot_db::repos::inspection::StartOutcome;
use chariot_db::service::ChariotService;
use chrono::Local;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InspectArgs;
use crate::context::AppContext;
use crate::output::output;

/// How an interactive run ended.
#[derive(Debug)]
pub enum InspectOutcome {
    Completed(Box<InspectionCompletion>),
    /// The operator chose not to repeat today's inspection.
    Declined,
    /// The operator quit midway. Nothing was saved.
    Abandoned { discarded: usize },
}

/// Handle `chk inspect`. Prompts go to stderr so stdout carries only the
/// stored record.
pub async fn run(args: &InspectArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut prompt = std::io::stderr();
    match run_with(&ctx.service, args, &mut input, &mut prompt).await? {
        InspectOutcome::Completed(completion) => output(&*completion, flags.format),
        InspectOutcome::Declined | InspectOutcome::Abandoned { .. } => Ok(()),
    }
}

/// Drive one inspection from `input`, writing prompts to `prompt`.
pub async fn run_with<R: BufRead, W: Write>(
    service: &ChariotService,
    args: &InspectArgs,
    input: &mut R,
    prompt: &mut W,
) -> anyhow::Result<InspectOutcome> {
    let Some(mut session) = begin(service, args, input, prompt).await? else {
        return Ok(InspectOutcome::Declined);
    };

    let equipment = session.equipment();
    writeln!(
        prompt,
        "Inspecting {} {} ({}), {} questions.",
        equipment.id,
        equipment.name,
        equipment.category.label(),
        session.questions().len()
    )?;

    while let Some(question) = session.current_question().cloned() {
        let (answered, total) = session.progress();
        writeln!(prompt)?;
        writeln!(prompt, "[{}/{}] {}", answered + 1, total, question.text)?;
        for (number, choice) in question.choices.iter().enumerate() {
            writeln!(prompt, "  {}. {}", number + 1, choice.text)?;
        }

        let choice = match read_choice(&question.choices, input, prompt)? {
            Picked::Choice(choice) => choice,
            Picked::Quit => {
                let discarded = service.cancel_inspection(session)?;
                writeln!(prompt, "Inspection abandoned; {discarded} answers discarded.")?;
                return Ok(InspectOutcome::Abandoned { discarded });
            }
            Picked::Closed => {
                service.cancel_inspection(session)?;
                bail!("input closed before the inspection finished; nothing was saved");
            }
        };

        let comment = if choice.is_acceptable {
            None
        } else {
            write!(prompt, "Describe the defect (Enter to skip): ")?;
            prompt.flush()?;
            let Some(line) = read_line(input)? else {
                service.cancel_inspection(session)?;
                bail!("input closed before the inspection finished; nothing was saved");
            };
            Some(line)
        };

        service.answer(&mut session, &choice.id, comment.as_deref(), None)?;
    }

    let mut saved = service.complete_inspection(session).await;
    loop {
        match saved {
            Ok(completion) => return Ok(InspectOutcome::Completed(Box::new(completion))),
            Err(CompletionError::Unfinished(error)) => return Err(error.into()),
            Err(CompletionError::Unsaved { completed, source }) => {
                writeln!(prompt, "Saving failed: {source}")?;
                write!(prompt, "Retry? [Y/n] ")?;
                prompt.flush()?;
                let retry = read_line(input)?
                    .is_some_and(|line| !matches!(line.trim().to_ascii_lowercase().as_str(), "n" | "no"));
                if !retry {
                    return Err(anyhow::Error::new(source).context("inspection not saved"));
                }
                saved = service.save_completed(*completed).await;
            }
        }
    }
}

async fn begin<R: BufRead, W: Write>(
    service: &ChariotService,
    args: &InspectArgs,
    input: &mut R,
    prompt: &mut W,
) -> anyhow::Result<Option<InspectionSession>> {
    match service.start_inspection(&args.equipment_id, args.yes).await? {
        StartOutcome::Started(session) => Ok(Some(session)),
        StartOutcome::NeedsConfirmation { equipment, previous } => {
            writeln!(
                prompt,
                "{} {} was already inspected today at {} by {} (status: {}).",
                equipment.id,
                equipment.name,
                previous.completed_at.with_timezone(&Local).format("%H:%M"),
                previous.operator_name,
                previous.status
            )?;
            write!(prompt, "Run another inspection? [y/N] ")?;
            prompt.flush()?;

            let confirmed = read_line(input)?
                .is_some_and(|line| matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"));
            if !confirmed {
                writeln!(prompt, "Inspection not started.")?;
                return Ok(None);
            }

            match service.start_inspection(&args.equipment_id, true).await? {
                StartOutcome::Started(session) => Ok(Some(session)),
                StartOutcome::NeedsConfirmation { .. } => {
                    bail!("inspection of {} could not be confirmed", args.equipment_id)
                }
            }
        }
    }
}

enum Picked {
    Choice(AnswerChoice),
    Quit,
    Closed,
}

/// Re-prompt until the operator enters a listed number or `q`.
fn read_choice<R: BufRead, W: Write>(
    choices: &[AnswerChoice],
    input: &mut R,
    prompt: &mut W,
) -> anyhow::Result<Picked> {
    loop {
        write!(prompt, "Choice (1-{}, q to quit): ", choices.len())?;
        prompt.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(Picked::Closed);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(Picked::Quit);
        }
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| choices.get(index));
        match picked {
            Some(choice) => return Ok(Picked::Choice(choice.clone())),
            None => writeln!(prompt, "Enter a number between 1 and {}.", choices.len())?,
        }
    }
}

/// One line without its terminator, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
