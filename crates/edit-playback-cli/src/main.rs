mod args;
mod view;

use std::io::{Stdout, stdout};
use std::ops::Range;
use std::time::Duration;
use std::{env, fs, process};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use edit_playback_config::{Config, PlaybackConfig};
use edit_playback_engine::Document;
use edit_playback_engine::streaming::{
    ChunkStream, EditHooks, ProgressiveEdit, StreamState, UndoGroup,
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio_util::sync::CancellationToken;

use crate::args::{Invocation, USAGE};

type Term = Terminal<CrosstermBackend<Stdout>>;

enum Outcome {
    Completed,
    Cancelled,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("edit-playback");

    let invocation = match Invocation::parse(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    init_logging(&config);

    let path = invocation.path.clone();
    let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut doc = Document::from_bytes(&bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    let range = doc
        .transformer()
        .offset_range(invocation.start, invocation.end)?;
    let replacement = invocation.replacement.read()?;
    log::info!(
        "replacing {}..{} in {} with {} bytes",
        invocation.start,
        invocation.end,
        path.display(),
        replacement.len()
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let title = path.display().to_string();
    let res = play(
        &mut terminal,
        &title,
        &mut doc,
        range,
        replacement,
        &config.playback,
    )
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match res? {
        Outcome::Completed => {
            fs::write(&path, doc.to_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        Outcome::Cancelled => {
            println!("Cancelled, {} left unchanged", path.display());
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let default_filter = config.log_filter.as_deref().unwrap_or("warn");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Types `replacement` over `range`, repainting after every chunk.
///
/// Esc or Ctrl-C cancels playback, in which case every chunk applied so far is
/// undone again.
async fn play(
    terminal: &mut Term,
    title: &str,
    doc: &mut Document,
    range: Range<usize>,
    replacement: String,
    playback: &PlaybackConfig,
) -> Result<Outcome> {
    let cancel = CancellationToken::new();
    let finished = CancellationToken::new();
    let watcher = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        let finished = finished.clone();
        move || watch_keys(&cancel, &finished)
    });

    let mut chunks = ChunkStream::new(replacement, playback.words_per_second, &cancel)
        .words_per_chunk(playback.words_per_chunk);
    let mut undo = UndoGroup::new();
    let result = type_chunks(terminal, title, doc, range, &mut chunks, &mut undo).await;

    finished.cancel();
    watcher.await??;
    result?;

    if chunks.state() == StreamState::Cancelled {
        log::info!("playback cancelled after {} chunks", chunks.emitted());
        undo.undo(doc)?;
        return Ok(Outcome::Cancelled);
    }
    Ok(Outcome::Completed)
}

async fn type_chunks(
    terminal: &mut Term,
    title: &str,
    doc: &mut Document,
    range: Range<usize>,
    chunks: &mut ChunkStream,
    undo: &mut UndoGroup,
) -> Result<()> {
    let mut edit = ProgressiveEdit::begin(doc, range.clone())?;
    if let Err(err) = terminal.draw(|f| view::ui(f, title, &*doc, range, "Esc: cancel")) {
        edit.finish(doc);
        return Err(err.into());
    }

    let mut result = Ok(());
    while let Some(chunk) = chunks.next().await {
        let remaining = chunks.remaining();
        result = apply_and_draw(terminal, title, doc, &mut edit, &chunk, undo, remaining);
        if result.is_err() {
            break;
        }
    }

    edit.finish(doc);
    result
}

fn apply_and_draw(
    terminal: &mut Term,
    title: &str,
    doc: &mut Document,
    edit: &mut ProgressiveEdit,
    chunk: &str,
    undo: &mut UndoGroup,
    remaining: &str,
) -> Result<()> {
    let mut hooks = EditHooks::default().with_progress(undo);
    edit.apply_chunk(doc, chunk, &mut hooks)?;

    let highlight = doc.decoration_range(edit.anchor()).unwrap_or(0..0);
    let status = format!("{} bytes to go | Esc: cancel", remaining.len());
    terminal.draw(|f| view::ui(f, title, &*doc, highlight, &status))?;
    Ok(())
}

/// Cancels playback on Esc or Ctrl-C until `finished` fires.
fn watch_keys(cancel: &CancellationToken, finished: &CancellationToken) -> Result<()> {
    while !finished.is_cancelled() {
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || key.code == KeyCode::Esc {
                cancel.cancel();
            }
        }
    }
    Ok(())
}
