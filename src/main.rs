mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal, ExecutableCommand,
};
use log::info;

use dino_strike::entities::{Command, Difficulty, Field, Level, Timings};
use dino_strike::session::Session;
use dino_strike::tasks;

/// Fly a helicopter, shoot dinosaurs, keep the depot stocked.
#[derive(Parser, Debug)]
#[command(name = "dino_strike", version)]
struct Cli {
    /// Skip the menu and play this level.
    #[arg(long, value_enum)]
    level: Option<Level>,
    /// Head hits needed to kill a dinosaur.
    #[arg(long)]
    hits: Option<u32>,
    /// Helicopter missile capacity.
    #[arg(long)]
    ammo: Option<u32>,
    /// Seconds between dinosaur spawns.
    #[arg(long)]
    spawn_secs: Option<u64>,
    /// Write log records to this file (filter with RUST_LOG).
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Cli {
    fn difficulty(&self, level: Level) -> Result<Difficulty> {
        level
            .difficulty()
            .with_overrides(self.hits, self.ammo, self.spawn_secs)
            .context("invalid difficulty override")
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Route records to a file; the terminal is busy being a game screen.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("cannot install logger")?;
    Ok(())
}

// ── Input ─────────────────────────────────────────────────────────────────────

fn to_command(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let command = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Command::MoveUp,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Command::MoveDown,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Command::MoveLeft,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Command::MoveRight,
        KeyCode::Char(' ') => Command::Fire,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Wait up to `timeout` for the next command; `Command::None` if none came.
fn next_command(rx: &mpsc::Receiver<Event>, timeout: Duration) -> Command {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(Event::Key(key)) => {
                if let Some(command) = to_command(key) {
                    return command;
                }
            }
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => return Command::None,
            Err(RecvTimeoutError::Disconnected) => return Command::Quit,
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

/// `None` means the player chose to quit.
fn choose_level<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> Result<Option<Level>> {
    display::draw_menu(out)?;
    loop {
        let Ok(event) = rx.recv() else {
            return Ok(None);
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event {
            match code {
                KeyCode::Char('1') => return Ok(Some(Level::Easy)),
                KeyCode::Char('2') => return Ok(Some(Level::Medium)),
                KeyCode::Char('3') => return Ok(Some(Level::Hard)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(None),
                _ => {}
            }
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

enum Outcome {
    Replay,
    Quit,
}

fn control_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    session: &Arc<Session>,
) -> Result<()> {
    let frame = session.timings().frame;
    while session.is_live() {
        {
            let world = session.lock();
            let depot = session.depot().status();
            display::render(out, &world, depot, session.difficulty())?;
        }
        let command = next_command(rx, frame);
        session.apply(command);
        session.control_tick(Instant::now());
    }
    Ok(())
}

fn play<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    difficulty: Difficulty,
) -> Result<Outcome> {
    let session = Session::new(Field::default(), difficulty, Timings::default());
    let background = match tasks::spawn_background(&session) {
        Ok(handles) => handles,
        Err(e) => {
            session.stop();
            return Err(e).context("cannot start background tasks");
        }
    };

    let result = control_loop(out, rx, &session);
    session.shutdown(background);
    result?;

    if !session.is_game_over() {
        return Ok(Outcome::Quit);
    }

    {
        let world = session.lock();
        info!("session over, {} kills", world.kills);
        display::render(out, &world, session.depot().status(), session.difficulty())?;
    }
    loop {
        let Ok(event) = rx.recv() else {
            return Ok(Outcome::Quit);
        };
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event {
            match code {
                KeyCode::Char('r') | KeyCode::Char('R') => return Ok(Outcome::Replay),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(Outcome::Quit)
                }
                _ => {}
            }
        }
    }
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, cli: &Cli) -> Result<()> {
    loop {
        let level = match cli.level {
            Some(level) => level,
            None => match choose_level(out, rx)? {
                Some(level) => level,
                None => break,
            },
        };
        let difficulty = cli.difficulty(level)?;
        info!("starting {} session: {:?}", level.label(), difficulty);

        match play(out, rx, difficulty)? {
            Outcome::Quit => break,
            Outcome::Replay => {}
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Reject bad overrides before the terminal goes raw.
    cli.difficulty(cli.level.unwrap_or(Level::Medium))?;
    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode().context("cannot enable raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread to blocking event reads so the control loop can
    // wait with a timeout.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &cli);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
