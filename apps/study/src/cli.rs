//! Line-oriented study front end.
//!
//! Commands: `show` (or an empty line) toggles the answer, any other word is
//! sent as a rating token, `finish` skips the rest of the ladder,
//! `add <term> = <translation>` creates an item, `edit <term> = <translation>`
//! corrects the shown item, `quit` leaves.

use review_core::{ItemContent, LearningItem};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::study::StudyDriver;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command<'a> {
    Show,
    Rate(&'a str),
    Finish,
    Add { term: &'a str, translation: &'a str },
    Edit { term: &'a str, translation: &'a str },
    Quit,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Result<Self, &'static str> {
        let line = line.trim();
        match line {
            "" | "show" | "s" => return Ok(Self::Show),
            "finish" | "f" => return Ok(Self::Finish),
            "quit" | "q" => return Ok(Self::Quit),
            _ => {}
        }
        if let Some(rest) = line.strip_prefix("add ") {
            let (term, translation) = term_pair(rest).ok_or("usage: add <term> = <translation>")?;
            return Ok(Self::Add { term, translation });
        }
        if let Some(rest) = line.strip_prefix("edit ") {
            let (term, translation) = term_pair(rest).ok_or("usage: edit <term> = <translation>")?;
            return Ok(Self::Edit { term, translation });
        }
        Ok(Self::Rate(line))
    }
}

fn term_pair(rest: &str) -> Option<(&str, &str)> {
    let (term, translation) = rest.split_once('=')?;
    let (term, translation) = (term.trim(), translation.trim());
    (!term.is_empty() && !translation.is_empty()).then_some((term, translation))
}

/// Drive one study session over `input`/`out` until `quit` or end of input.
pub async fn run_session<R, W>(driver: &mut StudyDriver, input: R, mut out: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        let current = driver.current().cloned();
        match &current {
            Some(item) => render(&mut out, driver, item).await?,
            None => out.write_all(b"Nothing due. Session complete.\n").await?,
        }
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                say(&mut out, usage).await?;
                continue;
            }
        };

        let message = match (command, &current) {
            (Command::Quit, _) => return Ok(()),
            (Command::Add { term, translation }, _) => {
                match driver.add_item(ItemContent::new(term, translation)).await {
                    Ok(item) => format!("Added {}", item.key),
                    Err(e) => format!("error: {e}"),
                }
            }
            (_, None) => continue,
            (Command::Show, Some(item)) => {
                driver.toggle_reveal(&item.key);
                continue;
            }
            (Command::Rate(token), Some(item)) => match driver.rate(&item.key, token).await {
                Ok(outcome) => describe(&outcome),
                Err(e) => format!("error: {e}"),
            },
            (Command::Finish, Some(item)) => match driver.finish_early(&item.key).await {
                Ok(outcome) => describe(&outcome),
                Err(e) => format!("error: {e}"),
            },
            (Command::Edit { term, translation }, Some(item)) => {
                let content = ItemContent {
                    term: term.to_string(),
                    translation: translation.to_string(),
                    ..item.content.clone()
                };
                match driver.edit_item(&item.key, content).await {
                    Ok(edited) => format!("Edited {}", edited.key),
                    Err(e) => format!("error: {e}"),
                }
            }
        };
        say(&mut out, &message).await?;
    }
}

fn describe(outcome: &review_core::ReviewOutcome) -> String {
    match outcome.patch.learning_step() {
        Some(step) => format!("{}: round {} next", outcome.key, step + 1),
        None => format!(
            "{}: next review {}",
            outcome.key,
            outcome.patch.due_at.format("%Y-%m-%d %H:%M")
        ),
    }
}

async fn render<W: AsyncWrite + Unpin>(
    out: &mut W,
    driver: &StudyDriver,
    item: &LearningItem,
) -> std::io::Result<()> {
    let counts = driver.counts();
    let mut text = String::new();
    text.push_str(&format!(
        "[{}] {}    (due {}/{}/{})\n",
        item.schedule.round_label().unwrap_or_else(|| "Review".to_string()),
        item.content.term,
        counts.first,
        counts.second,
        counts.third,
    ));
    if driver.is_revealed(&item.key) {
        let content = &item.content;
        text.push_str(&format!("  = {}", content.translation));
        if let Some(plural) = &content.plural {
            text.push_str(&format!(" (pl. {plural})"));
        }
        text.push('\n');
        if !content.example.is_empty() {
            text.push_str(&format!("  {}\n", content.example));
        }
        if !content.example_translation.is_empty() {
            text.push_str(&format!("  {}\n", content.example_translation));
        }
        text.push_str("  rate: very_hard | hard | medium | easy");
        if item.schedule.can_finish_early() {
            text.push_str(" | finish");
        }
        text.push('\n');
    }
    out.write_all(text.as_bytes()).await
}

async fn say<W: AsyncWrite + Unpin>(out: &mut W, message: &str) -> std::io::Result<()> {
    out.write_all(message.as_bytes()).await?;
    out.write_all(b"\n").await
}
