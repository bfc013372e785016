//! Command-line front end for jungle.
//!
//! Resolves the jungle directory and one command, calls into [`jungle::Jungle`],
//! prints the result, and picks the exit status. Nothing below this file
//! prints to stdout or exits the process.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use jungle::{Jungle, JungleError, Retention, Version, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "jungle",
    version,
    about = "Keep versioned deployments side by side and switch between them atomically",
    arg_required_else_help = true
)]
struct Cli {
    /// Announce skipped and deleted versions on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `current`, pointing at the highest version in `release/`.
    Init {
        /// Jungle directory (defaults to the working directory).
        path: Option<PathBuf>,
    },
    /// Point `current` at a version: `set <path> <version>` or `set <version>`.
    Set {
        #[arg(value_name = "PATH|VERSION")]
        first: String,
        #[arg(value_name = "VERSION")]
        second: Option<String>,
    },
    /// Point `current` at the highest version.
    Upgrade { path: Option<PathBuf> },
    /// Point `current` at the second-highest version.
    Degrade {
        /// Print the version that would become current without changing anything.
        #[arg(long)]
        dry_run: bool,
        path: Option<PathBuf>,
    },
    /// Print the active version.
    Current { path: Option<PathBuf> },
    /// Print `current` if the active version is the highest, else `degraded`.
    Status { path: Option<PathBuf> },
    /// Remove a version that is not current: `delete <path> <version>` or `delete <version>`.
    Delete {
        #[arg(value_name = "PATH|VERSION")]
        first: String,
        #[arg(value_name = "VERSION")]
        second: Option<String>,
    },
    /// Remove old versions by age or by count; the current version is never removed.
    Prune {
        #[command(flatten)]
        retention: RetentionArgs,
        path: Option<PathBuf>,
    },
    /// List versions in ascending order, marking the current one with `*`.
    List { path: Option<PathBuf> },
}

#[derive(Args, Debug, PartialEq, Eq)]
#[group(required = true, multiple = false)]
struct RetentionArgs {
    /// Remove versions older than this many whole days.
    #[arg(long, value_name = "DAYS")]
    age: Option<u64>,
    /// Remove the oldest versions until at most this many remain.
    #[arg(long, value_name = "N")]
    iterations: Option<usize>,
}

impl RetentionArgs {
    fn retention(&self) -> Retention {
        match (self.age, self.iterations) {
            (Some(days), _) => Retention::MaxAgeDays(days),
            (None, Some(keep)) => Retention::KeepLatest(keep),
            // clap enforces exactly one of the two.
            (None, None) => unreachable!("retention group is required"),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(parse_error_exit_code(&err));
        }
    };
    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(exit_codes::FAILURE);
    }
}

/// Help is success; anything else clap rejects is misuse.
fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => exit_codes::OK,
        _ => exit_codes::USAGE,
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { path } => cmd_init(path, cli.verbose),
        Command::Set { first, second } => {
            let (path, name) = path_and_version(first, second);
            cmd_set(path, &name, cli.verbose)
        }
        Command::Upgrade { path } => {
            let jungle = open(path, cli.verbose)?;
            println!("{}", jungle.upgrade()?);
            Ok(())
        }
        Command::Degrade { dry_run, path } => {
            let jungle = open(path, cli.verbose)?;
            println!("{}", jungle.degrade(dry_run)?);
            Ok(())
        }
        Command::Current { path } => {
            let jungle = open(path, cli.verbose)?;
            println!("{}", jungle.current()?);
            Ok(())
        }
        Command::Status { path } => {
            let jungle = open(path, cli.verbose)?;
            println!("{}", jungle.status()?);
            Ok(())
        }
        Command::Delete { first, second } => {
            let (path, name) = path_and_version(first, second);
            cmd_delete(path, &name, cli.verbose)
        }
        Command::Prune { retention, path } => {
            let jungle = open(path, cli.verbose)?;
            for version in jungle.prune(retention.retention())? {
                println!("{version}");
            }
            Ok(())
        }
        Command::List { path } => cmd_list(path, cli.verbose),
    }
}

fn cmd_init(path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let jungle = open(path, verbose)?;
    println!("Initialising jungle in {}", jungle.root().display());
    let head = jungle
        .init()
        .with_context(|| format!("initialise {}", jungle.root().display()))?;
    println!("{head}");
    Ok(())
}

fn cmd_set(path: Option<PathBuf>, name: &str, verbose: bool) -> Result<()> {
    let jungle = open(path, verbose)?;
    let version = requested_version(name)?;
    println!("{}", jungle.set(&version)?);
    Ok(())
}

fn cmd_delete(path: Option<PathBuf>, name: &str, verbose: bool) -> Result<()> {
    let jungle = open(path, verbose)?;
    let version = requested_version(name)?;
    jungle.delete(&version)?;
    println!("{version}");
    Ok(())
}

fn cmd_list(path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let jungle = open(path, verbose)?;
    // An uninitialised jungle still lists; a corrupt pointer is an error.
    let current = match jungle.current() {
        Ok(version) => Some(version),
        Err(JungleError::NoCurrent { .. }) => None,
        Err(err) => return Err(err.into()),
    };
    for version in jungle.versions()? {
        let marker = if Some(&version) == current.as_ref() { "*" } else { " " };
        println!("{marker} {version}");
    }
    Ok(())
}

/// `set`/`delete` take `<path> <version>` or just `<version>`.
fn path_and_version(first: String, second: Option<String>) -> (Option<PathBuf>, String) {
    match second {
        Some(version) => (Some(PathBuf::from(first)), version),
        None => (None, first),
    }
}

/// A name that cannot be a version can never be present in the jungle.
fn requested_version(name: &str) -> Result<Version> {
    name.parse::<Version>().map_err(|_| {
        JungleError::UnknownVersion {
            version: name.to_string(),
        }
        .into()
    })
}

/// Open the jungle at `path` (or the working directory) and start logging.
fn open(path: Option<PathBuf>, verbose: bool) -> Result<Jungle> {
    let root = match path {
        Some(path) => path,
        None => std::env::current_dir().context("resolve working directory")?,
    };
    let mut jungle =
        Jungle::open(&root).with_context(|| format!("open jungle {}", root.display()))?;
    if verbose {
        jungle.set_verbose(true);
    }
    logging::init(jungle.config().verbose);
    Ok(jungle)
}
