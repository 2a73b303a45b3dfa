use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use rcdiff::commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rcdiff")]
#[command(about = "Find strings missing between the language files of Windows resource scripts", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RCDIFF_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree for component folders and report missing strings
    Scan {
        /// Root of the tree (defaults to current directory)
        #[arg(default_value = ".")]
        root: String,
        /// Also list folders with nothing missing
        #[arg(long)]
        all: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Path to rcdiff.toml (default: <ROOT>/rcdiff.toml if present)
        #[arg(long)]
        config: Option<String>,
        /// Folders to load in parallel
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Compare one component folder; fails if any string is missing
    Check {
        /// Directory holding the .rc files
        folder: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the parsed statements of one .rc file and their synthesized ids
    Parse {
        /// Path to .rc file
        file: String,
    },
    /// Show translations and gaps for one synthesized id
    Show {
        /// Directory holding the .rc files
        folder: String,
        /// Synthesized id, e.g. IDD_MAIN_IDC_OK#0
        id: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("RCDIFF_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("rcdiff={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Scan { root, all, json, config, jobs } => {
            commands::scan::execute(&commands::scan::ScanOptions {
                root: &root,
                all,
                json,
                config: config.as_deref(),
                jobs,
            })
        }
        Commands::Check { folder, json } => {
            commands::check::execute(&folder, json)
        }
        Commands::Parse { file } => {
            commands::parse::execute(&file)
        }
        Commands::Show { folder, id } => {
            commands::show::execute(&folder, &id)
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
