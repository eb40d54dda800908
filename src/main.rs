mod config;
mod replay;
mod script;
mod seed;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use canvas::codegen;
use canvas::engine::EngineCore;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Seed(#[from] seed::SeedError),
    #[error(transparent)]
    Script(#[from] script::ScriptError),
    #[error(transparent)]
    Replay(#[from] replay::ReplayError),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "jigsaw", about = "Block-based program editor engine driver")]
struct Cli {
    /// JSON file with layout overrides; missing fields keep their defaults.
    #[arg(long, global = true, env = "JIGSAW_LAYOUT")]
    layout: Option<PathBuf>,

    /// Log at DEBUG instead of INFO.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the built-in starter blocks as JSON.
    Seed,
    /// Print the program text for a block set.
    Code {
        /// Seed file (JSON array of blocks); the starter blocks when absent.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Check a seed file's ids and relations.
    Validate {
        #[arg(long)]
        seed: PathBuf,
    },
    /// Run a pointer-event script against a block set and print the result.
    Replay {
        #[arg(long)]
        seed: Option<PathBuf>,

        #[arg(long, help = "Event script path (JSON Lines), or - for stdin")]
        events: String,

        /// Print every step with the actions it produced.
        #[arg(long, default_value_t = false)]
        trace: bool,

        /// Print the final editor state as JSON after the code.
        #[arg(long, default_value_t = false)]
        state: bool,
    },
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();

    let layout = config::load_layout(cli.layout.as_deref())?;

    match cli.command {
        Command::Seed => {
            println!("{}", serde_json::to_string_pretty(&seed::load_seed(None)?)?);
        }
        Command::Code { seed: seed_path } => {
            let doc = seed::check_seed(seed::load_seed(seed_path.as_deref())?)?;
            println!("{}", codegen::generate_code(&doc));
        }
        Command::Validate { seed: seed_path } => {
            let doc = seed::check_seed(seed::load_seed(Some(&seed_path))?)?;
            println!("ok: {} blocks", doc.len());
        }
        Command::Replay { seed: seed_path, events, trace, state } => {
            let blocks = seed::load_seed(seed_path.as_deref())?;
            let mut core = EngineCore::with_layout(layout);
            core.load_seed(blocks).map_err(seed::SeedError::from)?;

            let events = script::parse_script(open_input(&events)?)?;
            tracing::info!(events = events.len(), "replaying script");
            let report = replay::replay(&mut core, &events)?;

            if trace {
                for (i, step) in report.steps.iter().enumerate() {
                    let event = serde_json::to_string(&step.event)?;
                    match step.target {
                        Some(target) => println!("{}\t{event}\t{target:?}\t{:?}", i + 1, step.actions),
                        None => println!("{}\t{event}\t{:?}", i + 1, step.actions),
                    }
                }
            }
            println!("{}", report.final_code);
            if state {
                println!("{}", serde_json::to_string_pretty(&core.state)?);
            }
            tracing::info!(
                steps = report.steps.len(),
                code_emissions = report.code_emissions,
                "replay finished"
            );
        }
    }
    Ok(())
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>, CliError> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|source| CliError::Open { path: Path::new(path).to_owned(), source })?;
    Ok(Box::new(BufReader::new(file)))
}
