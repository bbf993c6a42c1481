//! Chess session host.
//!
//! Each invocation loads the stored game, applies one operation (a square
//! click, a promotion choice, undo, ...) and stores the game back. Runs are
//! expected to be serialized by the caller; nothing here locks the session
//! file.

mod config;
mod render;
mod session;

use anyhow::Context;
use chess_core::{Promotion, Square};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use config::Config;
use session::Session;

/// Play chess one click at a time against a stored session.
#[derive(Parser)]
#[command(name = "chess-session")]
#[command(about = "Plays a stored chess game one operation at a time")]
struct Args {
    /// Path to the config file
    #[arg(long, default_value = "chess-session.toml")]
    config: PathBuf,

    /// Session file (overrides the config)
    #[arg(long)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the board
    Show,
    /// Click a square: select a piece, move it, or deselect
    Click {
        #[arg(value_parser = parse_square)]
        square: Square,
    },
    /// Play a whole move in coordinate notation (e2e4, e7e8n)
    Move { text: String },
    /// Choose the piece for a pending promotion
    Promote {
        #[arg(value_parser = parse_promotion)]
        piece: Promotion,
    },
    /// Take back the last move
    Undo,
    /// Start a new game
    Reset,
    /// Turn the board around
    Flip,
    /// List the legal destinations of the piece on a square
    Legal {
        #[arg(value_parser = parse_square)]
        square: Square,
    },
    /// Print the render view as JSON
    View,
    /// Print the position as FEN
    Fen,
}

fn parse_square(s: &str) -> Result<Square, String> {
    Square::from_algebraic(s).ok_or_else(|| format!("not a square: {}", s))
}

fn parse_promotion(s: &str) -> Result<Promotion, String> {
    let mut chars = s.chars();
    match (chars.next().and_then(Promotion::from_char), chars.next()) {
        (Some(p), None) => Ok(p),
        _ => Err(format!("expected one of q, r, b, n; got {}", s)),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies one command. Returns the text to print and whether the session
/// changed. A rejected game operation is shown as the notice over the
/// unchanged board.
fn run(session: &mut Session, command: &Command) -> anyhow::Result<(String, bool)> {
    let outcome = match command {
        Command::Show => Ok(None),
        Command::Click { square } => session.game.select_or_move(*square).map(Some),
        Command::Move { text } => session.game.play_uci(text).map(Some),
        Command::Promote { piece } => session.game.choose_promotion(*piece).map(Some),
        Command::Undo => session.game.undo().map(Some),
        Command::Reset => Ok(Some(session.game.reset())),
        Command::Flip => {
            session.flip();
            Ok(None)
        }
        Command::Legal { square } => {
            let destinations: Vec<String> = session
                .game
                .legal_destinations(*square)
                .iter()
                .map(|sq| sq.to_string())
                .collect();
            return Ok((destinations.join(" "), false));
        }
        Command::View => {
            let json = serde_json::to_string_pretty(&session.game.view())?;
            return Ok((json, false));
        }
        Command::Fen => return Ok((session.game.to_fen(), false)),
    };

    let (message, changed) = match outcome {
        Ok(notice) => (notice.map(|n| n.to_string()), *command != Command::Show),
        Err(e) => {
            warn!(error = %e, command = ?command, "operation rejected");
            (Some(e.to_string()), false)
        }
    };
    let text = render::render(&session.game.view(), session.flipped, message.as_deref());
    Ok((text, changed))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    init_tracing(&config.log_level);

    let path = args.session.unwrap_or(config.session_path);
    tracing::debug!(session = %path.display(), command = ?args.command, "starting");

    let mut session = Session::load(&path, config.flipped)?;
    let (text, changed) = run(&mut session, &args.command)
        .with_context(|| format!("running {:?}", args.command))?;
    if changed {
        session.save(&path)?;
    }
    println!("{}", text);
    Ok(())
}
