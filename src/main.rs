//! Command-line access to tracked histories.
//!
//! # Usage
//!
//! ```bash
//! tracked log history.json
//! tracked checkout base.txt history.json
//! tracked blame base.txt history.json --pos 12
//! tracked revert base.txt history.json --exclude 3f2a... --out reverted.json
//! tracked pick base.txt pick.json onto.json --out merged.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tracked::{
    checkout_with, commit_from_json, CommitId, Doc, Session, TrackConfig, TrackError,
};

/// Inspect and rewrite document histories
#[derive(Parser, Debug)]
#[command(name = "tracked", version, about, long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the commits of a history, root first
    Log {
        history: PathBuf,
    },

    /// Print the document a history produces
    Checkout {
        base: PathBuf,
        history: PathBuf,
    },

    /// Show which commit wrote each part of the document
    Blame {
        base: PathBuf,
        history: PathBuf,

        /// Only report the commit at this position
        #[arg(long)]
        pos: Option<usize>,
    },

    /// Rewrite a history without some commits
    Revert {
        base: PathBuf,
        history: PathBuf,

        /// Commit id to drop; repeatable
        #[arg(long, required = true)]
        exclude: Vec<CommitId>,

        /// Write the new history here instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Replay the pick history on top of the onto history
    Pick {
        base: PathBuf,
        pick: PathBuf,
        onto: PathBuf,

        /// Write the new history here instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

fn load_session(config: &TrackConfig, base: &Path, history: &Path) -> Result<Session, TrackError> {
    let base = Doc::new(&std::fs::read_to_string(base)?);
    let head = commit_from_json(&std::fs::read_to_string(history)?)?;
    return Ok(checkout_with(&base, &head, config.clone()));
}

fn write_history(session: &Session, out: Option<&Path>) -> Result<(), TrackError> {
    let json = session.to_json()?;
    match out {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    return Ok(());
}

fn run(cli: Cli) -> Result<(), TrackError> {
    let config = match &cli.config {
        Some(path) => TrackConfig::load(path)?,
        None => TrackConfig::default(),
    };

    match cli.command {
        Command::Log { history } => {
            let head = commit_from_json(&std::fs::read_to_string(history)?)?;
            for commit in head.chain() {
                println!("{} {} steps, {} spans", commit.id(), commit.steps().len(), commit.blame().len());
            }
        }
        Command::Checkout { base, history } => {
            let session = load_session(&config, &base, &history)?;
            print!("{}", session.doc());
        }
        Command::Blame { base, history, pos } => {
            let session = load_session(&config, &base, &history)?;
            match pos {
                Some(pos) => match session.blame_at(pos) {
                    Some(id) => println!("{id}"),
                    None => println!("base"),
                },
                None => {
                    for span in session.head().blame() {
                        let Some(id) = span.commit else { continue };
                        let text = session.doc().slice(span.from, span.to)?;
                        println!("{:>6}..{:<6} {} {:?}", span.from, span.to, id.short(), text);
                    }
                }
            }
        }
        Command::Revert { base, history, exclude, out } => {
            let mut session = load_session(&config, &base, &history)?;
            session.revert(&exclude)?;
            write_history(&session, out.as_deref())?;
        }
        Command::Pick { base, pick, onto, out } => {
            let mut session = load_session(&config, &base, &onto)?;
            let pick = commit_from_json(&std::fs::read_to_string(pick)?)?;
            session.cherry_pick(&pick)?;
            write_history(&session, out.as_deref())?;
        }
    }
    return Ok(());
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    return match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    };
}
