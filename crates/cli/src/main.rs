//! order-docx - render shop orders into Word templates
//!
//! Logging is controlled through `RUST_LOG`, e.g. `RUST_LOG=order_document=debug`.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::RenderArgs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            template,
            order,
            settings,
            out,
            download,
        } => commands::render(RenderArgs {
            template,
            order,
            settings,
            out,
            download,
        }),
        Commands::Variables { template, json } => commands::variables(&template, json),
        Commands::Init { path, force } => commands::init(&path, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
