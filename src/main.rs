use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use scribe::commands::Command;
use scribe::config::Config;
use scribe::document::{Position, Selection};
use scribe::editor::{EditorHost, MemoryEditor, NoticeLevel};
use scribe::llm::InferenceGateway;
use scribe::preview::{paint, PaintStyle};
use scribe::session::{Outcome, Session};

#[derive(Parser)]
#[command(name = "scribe", about = "Proofread, translate, improve or continue text with a language model.")]
struct Cli {
    /// check, translate, improve, summarize or continue
    command: Command,

    /// File to work on
    file: PathBuf,

    /// Caret line (1-based). Picks the paragraph around it.
    #[arg(short, long, default_value_t = 1)]
    line: usize,

    /// Caret column (1-based)
    #[arg(short, long, default_value_t = 1)]
    column: usize,

    /// Explicit selection as two LINE:COL positions (1-based)
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    select: Option<Vec<String>>,

    /// Apply the suggestion without asking
    #[arg(short, long)]
    yes: bool,

    /// Word-diff markers instead of colors
    #[arg(long)]
    plain: bool,
}

/// Parse a 1-based `LINE:COL` into a position.
fn parse_position(raw: &str) -> Result<Position> {
    let (line, column) = raw
        .split_once(':')
        .with_context(|| format!("expected LINE:COL, got '{raw}'"))?;
    let line: usize = line.trim().parse().with_context(|| format!("bad line in '{raw}'"))?;
    let column: usize = column.trim().parse().with_context(|| format!("bad column in '{raw}'"))?;
    Ok(Position::new(line.saturating_sub(1), column.saturating_sub(1)))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scribe=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    if !cli.command.needs_inference() {
        bail!("`{}` only applies inside an editing session", cli.command);
    }

    let settings = Config::load()?.settings();
    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let selection = match &cli.select {
        Some(bounds) => Selection::new(parse_position(&bounds[0])?, parse_position(&bounds[1])?),
        None => Selection::caret(Position::new(
            cli.line.saturating_sub(1),
            cli.column.saturating_sub(1),
        )),
    };

    let mut editor = MemoryEditor::with_selection(&text, selection);
    let mut session = Session::new(InferenceGateway::new());

    info!(command = %cli.command, file = %cli.file.display(), "scribe starting");
    let outcome = session.run(&mut editor, &settings, cli.command).await;

    for notice in editor.take_notices() {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }

    match outcome {
        Outcome::Proposed(_) => {}
        Outcome::Failed => bail!("{} failed", cli.command),
        _ => return Ok(()),
    }

    if let Some(anchor) = session.state().anchor() {
        let style = if cli.plain { PaintStyle::Plain } else { PaintStyle::Ansi };
        println!(
            "{}",
            paint(
                editor.document(),
                editor.decorations(),
                anchor.start.line..=anchor.end.line,
                style
            )
        );
    }

    if cli.yes || confirm("Apply this suggestion? [y/N] ")? {
        session.run(&mut editor, &settings, Command::Accept).await;
        std::fs::write(&cli.file, editor.text())
            .with_context(|| format!("failed to write {}", cli.file.display()))?;
        println!("Updated {}", cli.file.display());
    } else {
        session.run(&mut editor, &settings, Command::Clear).await;
    }

    session.shutdown(&mut editor);
    Ok(())
}
