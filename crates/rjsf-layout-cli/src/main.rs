use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod util;

#[derive(Parser)]
#[command(name = "rjsf-layout", about = "Inspect JSON Schema form layout grids", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a layout grid into its resolved layout tree
    Render(commands::render::Args),
    /// Resolve a dotted field path against the schema
    Resolve(commands::resolve::Args),
    /// Switch a discriminated union field to another branch
    Switch(commands::switch::Args),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Switch(args) => commands::switch::run(args),
    }
}
