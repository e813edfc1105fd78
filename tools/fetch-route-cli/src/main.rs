//! fetch-route CLI - Inspect route trees, cache keys and endpoints.
//!
//! Commands:
//! - `fetch-route keys` - Derive the fetch and storage keys for a URL template
//! - `fetch-route routes` - Decorate a route file and print the tree
//! - `fetch-route fetch` - Fetch the data behind a named route

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{FetchArgs, KeysArgs, RoutesArgs};

/// fetch-route CLI - Route-bound data fetching tools
#[derive(Parser)]
#[command(name = "fetch-route")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive cache keys for a URL template
    Keys(KeysArgs),

    /// Decorate a route file and print the tree
    Routes(RoutesArgs),

    /// Fetch the data behind a named route
    Fetch(FetchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let result = match cli.command {
        Commands::Keys(args) => commands::keys::run(args, &ctx).await,
        Commands::Routes(args) => commands::routes::run(args, &ctx).await,
        Commands::Fetch(args) => commands::fetch::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
