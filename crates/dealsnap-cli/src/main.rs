mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::debt::{IrrArgs, PaymentArgs};
use commands::quick::SnapArgs;
use commands::underwrite::UnderwriteArgs;

/// Real-estate deal underwriting and quick screening
#[derive(Parser)]
#[command(
    name = "dealsnap",
    version,
    about = "Real-estate deal underwriting and quick screening",
    long_about = "Underwrite income property with decimal precision: multi-year pro forma, \
                  levered IRR and a target verdict, or a one-year DealSnap screen with \
                  smart-default expenses and a Pursue / Watch / Pass triage."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver and pro forma detail to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full underwriting: pro forma, exit, IRR and verdict against targets
    Underwrite(UnderwriteArgs),
    /// DealSnap quick screen from units, rent and price
    Snap(SnapArgs),
    /// Monthly payment and annual debt service for a loan
    Payment(PaymentArgs),
    /// Internal rate of return of a cash-flow stream
    Irr(IrrArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Underwrite(args) => commands::underwrite::run_underwrite(args),
        Commands::Snap(args) => commands::quick::run_snap(args),
        Commands::Payment(args) => commands::debt::run_payment(args),
        Commands::Irr(args) => commands::debt::run_irr(args),
        Commands::Version => {
            println!("dealsnap {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
