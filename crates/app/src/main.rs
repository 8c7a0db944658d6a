mod console;

use std::fmt;
use std::path::PathBuf;

use exam_core::model::ExamCatalog;
use services::{CatalogLoader, ExamRunner, RunnerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::console::{
    Command as ConsoleCommand, HELP, parse_command, render_report, render_session,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingCatalog,
    InvalidDuration { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingCatalog => {
                write!(f, "no catalog given (use --catalog or EXAM_CATALOG)")
            }
            ArgsError::InvalidDuration { raw } => {
                write!(f, "invalid --duration value: {raw} (expected minutes > 0)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- run   --catalog <file.json> [--duration <minutes>]");
    eprintln!("                            [--content-base <url>] [--json]");
    eprintln!("  cargo run -p app -- check --catalog <file.json> [--content-base <url>]");
    eprintln!();
    eprintln!("Defaults for run:");
    eprintln!("  --duration taken from the catalog");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_CATALOG, EXAM_DURATION_MINUTES, EXAM_CONTENT_BASE");
    eprintln!("  EXAM_LOG (falls back to RUST_LOG, default \"warn\")");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Check,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "check" => Some(Self::Check),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    catalog: PathBuf,
    duration_minutes: Option<u32>,
    content_base: Option<String>,
    json: bool,
}

fn parse_duration(raw: String) -> Result<u32, ArgsError> {
    match raw.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ArgsError::InvalidDuration { raw }),
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut catalog = std::env::var("EXAM_CATALOG").ok().map(PathBuf::from);
        let mut duration_minutes = std::env::var("EXAM_DURATION_MINUTES")
            .ok()
            .map(parse_duration)
            .transpose()?;
        let mut content_base = std::env::var("EXAM_CONTENT_BASE").ok();
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => catalog = Some(PathBuf::from(require_value(args, "--catalog")?)),
                "--duration" => {
                    duration_minutes = Some(parse_duration(require_value(args, "--duration")?)?);
                }
                "--content-base" => content_base = Some(require_value(args, "--content-base")?),
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            catalog: catalog.ok_or(ArgsError::MissingCatalog)?,
            duration_minutes,
            content_base: content_base.filter(|base| !base.trim().is_empty()),
            json,
        })
    }

    fn loader(&self) -> CatalogLoader {
        match &self.content_base {
            Some(base) => CatalogLoader::new().with_content_base(base.clone()),
            None => CatalogLoader::new(),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("EXAM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_catalog(catalog: &ExamCatalog) {
    let title = if catalog.title.is_empty() {
        "(untitled)"
    } else {
        catalog.title.as_str()
    };
    println!("{title}");
    println!("  questions: {}", catalog.len());
    println!("  duration:  {} min", catalog.duration_minutes);
    println!("  max score: {:.2}", catalog.max_score());
}

async fn run_session(catalog: ExamCatalog, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut runner = ExamRunner::start(catalog, RunnerConfig::default())?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render_session(&runner.snapshot()));
    println!("type `help` for commands");

    loop {
        tokio::select! {
            submission = runner.submitted() => {
                if let Some(submission) = submission {
                    println!("exam submitted ({})", submission.reason);
                }
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("stdin closed, leaving session");
                    runner.stop_timer();
                    println!("session abandoned");
                    return Ok(());
                };
                match parse_command(&line) {
                    Ok(ConsoleCommand::Action(action)) => {
                        let snapshot = runner.apply(action);
                        if !snapshot.is_submitted() {
                            println!("{}", render_session(&snapshot));
                        }
                    }
                    Ok(ConsoleCommand::Show) => println!("{}", render_session(&runner.snapshot())),
                    Ok(ConsoleCommand::Help) => println!("{HELP}"),
                    Ok(ConsoleCommand::Quit) => {
                        runner.stop_timer();
                        println!("session abandoned");
                        return Ok(());
                    }
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    let Some(report) = runner.report() else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_report(&report));
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: start a session when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut catalog = parsed.loader().load_path(&parsed.catalog).await?;
    if let Some(minutes) = parsed.duration_minutes {
        tracing::debug!(minutes, "overriding catalog duration");
        catalog.duration_minutes = minutes;
    }

    match cmd {
        Command::Check => {
            print_catalog(&catalog);
            Ok(())
        }
        Command::Run => run_session(catalog, parsed.json).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "exam runner failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
