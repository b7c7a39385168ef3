use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::cursor;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use directories::ProjectDirs;
use liquidtext_core::config::default_config_path;
use liquidtext_core::{
    Command, DocumentBackend, ExtractionTicket, SessionEvent, ViewerConfig, ViewerSession,
};
use liquidtext_render::DocumentOpener;
use liquidtext_tty::{
    EventMapper, InputMode, LineRenderer, PointerTracker, ScreenLayout, UiEvent,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "liquidtext",
    version,
    about = "Terminal document viewer with a movable, searchable text layer"
)]
struct Args {
    /// Page to open on (0-based)
    #[arg(short = 'p', long = "page")]
    page: Option<usize>,

    /// Config file (defaults to the platform config directory)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Initial search query
    #[arg(short = 'q', long = "query")]
    query: Option<String>,

    /// Print the view snapshot as JSON instead of starting the UI
    #[arg(long)]
    dump: bool,

    /// PDF or plain-text document to open
    file: PathBuf,
}

/// Results flowing back from background extraction into the UI loop.
enum Message {
    Apply(Command),
    IndexingDone,
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(
            stdout,
            DisableMouseCapture,
            LeaveAlternateScreen,
            cursor::Show
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let project_dirs = ProjectDirs::from("net", "liquidtext", "liquidtext")
        .ok_or_else(|| anyhow!("unable to resolve platform data directories"))?;
    let _log_guard = init_logging(&project_dirs, args.dump)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&project_dirs));
    let config = ViewerConfig::load(&config_path)
        .with_context(|| format!("failed to load config {:?}", config_path))?;

    let provider = DocumentOpener::new();
    let mut session = ViewerSession::open_with(&provider, args.file.clone(), config)
        .await
        .with_context(|| format!("failed to open {:?}", args.file))?;

    if let Some(page) = args.page {
        session.apply(Command::GotoPage { page });
    }
    if let Some(query) = args.query.clone() {
        session.apply(Command::SetQuery { query });
    }

    let (tx, rx) = mpsc::unbounded_channel();
    spawn_indexer(session.backend(), tx.clone());

    if args.dump {
        dump_snapshot(session, rx, tx).await
    } else {
        run_ui(session, rx, tx)
    }
}

/// Waits for the start page and the background index, then prints JSON.
async fn dump_snapshot(
    mut session: ViewerSession,
    mut rx: UnboundedReceiver<Message>,
    tx: UnboundedSender<Message>,
) -> Result<()> {
    let mut indexing_done = false;
    loop {
        dispatch_session_events(&session, &tx);
        if indexing_done && session.pending_extraction().is_none() {
            break;
        }
        match rx.recv().await {
            Some(Message::Apply(command)) => session.apply(command),
            Some(Message::IndexingDone) => indexing_done = true,
            None => break,
        }
    }

    let json = session.snapshot().to_json()?;
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json)?;
    Ok(())
}

fn run_ui(
    mut session: ViewerSession,
    mut rx: UnboundedReceiver<Message>,
    tx: UnboundedSender<Message>,
) -> Result<()> {
    let _raw = RawModeGuard::new()?;
    let mut renderer = LineRenderer::new(io::stdout());
    let mut mapper = EventMapper::new();
    let mut pointer = PointerTracker::new();
    let mut clipboard: Option<arboard::Clipboard> = None;
    let mut screen = None;
    let mut dirty = true;

    loop {
        while let Ok(message) = rx.try_recv() {
            match message {
                Message::Apply(command) => {
                    session.apply(command);
                }
                Message::IndexingDone => info!("document fully indexed"),
            }
        }
        if dispatch_session_events(&session, &tx) {
            dirty = true;
        }

        if dirty {
            screen = Some(redraw(&mut renderer, &session, &mapper)?);
            dirty = false;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let ui_event = mapper.map_event(event::read()?);
        let Some(layout) = screen.as_ref() else {
            continue;
        };
        let mut ctx = EventContext {
            session: &mut session,
            pointer: &mut pointer,
            screen: layout,
            clipboard: &mut clipboard,
        };
        match handle_event(ui_event, &mut ctx)? {
            LoopAction::ContinueRedraw => dirty = true,
            LoopAction::Continue => {}
            LoopAction::Quit => break,
        }
        if matches!(mapper.mode(), InputMode::Search) {
            dirty = true;
        }
    }

    Ok(())
}

enum LoopAction {
    Continue,
    ContinueRedraw,
    Quit,
}

struct EventContext<'a> {
    session: &'a mut ViewerSession,
    pointer: &'a mut PointerTracker,
    screen: &'a ScreenLayout,
    clipboard: &'a mut Option<arboard::Clipboard>,
}

fn handle_event(event: UiEvent, ctx: &mut EventContext<'_>) -> Result<LoopAction> {
    match event {
        UiEvent::Command(command) => {
            ctx.session.apply(command);
            Ok(LoopAction::ContinueRedraw)
        }
        UiEvent::BeginSearch => Ok(LoopAction::ContinueRedraw),
        UiEvent::SearchQueryChanged { query } | UiEvent::SearchSubmit { query } => {
            ctx.session.apply(Command::SetQuery { query });
            Ok(LoopAction::ContinueRedraw)
        }
        UiEvent::SearchCancel => {
            ctx.session.apply(Command::SetQuery {
                query: String::new(),
            });
            Ok(LoopAction::ContinueRedraw)
        }
        UiEvent::PointerDown { row } => {
            let line = ctx.screen.line_at(row);
            let selected = line.is_some_and(|line| ctx.session.selection().contains(line));
            ctx.pointer.down(line, selected);
            Ok(LoopAction::Continue)
        }
        UiEvent::PointerDrag { row } => {
            let commands = ctx.pointer.drag(ctx.screen.offset_for_row(row));
            Ok(apply_all(ctx.session, commands))
        }
        UiEvent::PointerUp => {
            let commands = ctx.pointer.up();
            Ok(apply_all(ctx.session, commands))
        }
        UiEvent::Yank => {
            yank_selection(ctx.session, ctx.clipboard);
            Ok(LoopAction::Continue)
        }
        UiEvent::Quit => Ok(LoopAction::Quit),
        UiEvent::None => Ok(LoopAction::Continue),
    }
}

fn apply_all(session: &mut ViewerSession, commands: Vec<Command>) -> LoopAction {
    if commands.is_empty() {
        return LoopAction::Continue;
    }
    for command in commands {
        session.apply(command);
    }
    LoopAction::ContinueRedraw
}

fn yank_selection(session: &ViewerSession, clipboard: &mut Option<arboard::Clipboard>) {
    let text = session.selected_text();
    if text.is_empty() {
        return;
    }
    if clipboard.is_none() {
        match arboard::Clipboard::new() {
            Ok(handle) => *clipboard = Some(handle),
            Err(err) => {
                warn!(?err, "clipboard unavailable");
                return;
            }
        }
    }
    if let Some(handle) = clipboard.as_mut() {
        match handle.set_text(text) {
            Ok(()) => info!(lines = session.selection().len(), "selection copied"),
            Err(err) => warn!(?err, "failed to copy selection"),
        }
    }
}

/// Starts extraction for every request the session issued. Returns true
/// when the session asked for a redraw.
fn dispatch_session_events(session: &ViewerSession, tx: &UnboundedSender<Message>) -> bool {
    let mut redraw = false;
    for event in session.drain_events() {
        match event {
            SessionEvent::ExtractionRequested(ticket) => {
                spawn_extraction(session.backend(), ticket, tx.clone());
            }
            SessionEvent::PageChanged { page } => debug!(page, "page changed"),
            SessionEvent::SearchUpdated { matches } => debug!(matches, "search updated"),
            SessionEvent::RedrawNeeded(_) => redraw = true,
        }
    }
    redraw
}

fn spawn_extraction(
    backend: Arc<dyn DocumentBackend>,
    ticket: ExtractionTicket,
    tx: UnboundedSender<Message>,
) {
    tokio::task::spawn_blocking(move || {
        let text = backend
            .page_text(ticket.page)
            .map_err(|err| format!("{err:#}"));
        let _ = tx.send(Message::Apply(Command::ExtractionFinished { ticket, text }));
    });
}

fn spawn_indexer(backend: Arc<dyn DocumentBackend>, tx: UnboundedSender<Message>) {
    tokio::task::spawn_blocking(move || {
        let page_count = backend.info().page_count;
        for page in 0..page_count {
            match backend.page_text(page) {
                Ok(text) => {
                    if tx
                        .send(Message::Apply(Command::PageIndexed { page, text }))
                        .is_err()
                    {
                        return;
                    }
                }
                Err(err) => warn!(page, ?err, "failed to index page"),
            }
        }
        let _ = tx.send(Message::IndexingDone);
    });
}

fn redraw(
    renderer: &mut LineRenderer<io::Stdout>,
    session: &ViewerSession,
    mapper: &EventMapper,
) -> Result<ScreenLayout> {
    let (columns, rows) = terminal::size()?;
    let snapshot = session.snapshot();
    let text_rows = rows.saturating_sub(2).max(1);
    let screen = ScreenLayout::new(&snapshot, 1, text_rows, session.config().rows_per_unit);
    let status = combine_status(snapshot.status.clone(), mapper.pending_input().as_deref());
    renderer.draw(&snapshot, &screen, columns, rows, &status)?;
    Ok(screen)
}

fn combine_status(base: String, pending_input: Option<&str>) -> String {
    match pending_input {
        Some(pending) if !pending.is_empty() => format!("{} [{}]", base, pending),
        _ => base,
    }
}

fn init_logging(project_dirs: &ProjectDirs, console: bool) -> Result<WorkerGuard> {
    let log_dir = project_dirs.data_local_dir().join("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "liquidtext.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);
    // The UI owns stdout; only headless runs log to the terminal.
    let console_layer = console.then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
