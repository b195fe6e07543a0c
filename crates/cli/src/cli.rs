//! Command line structure using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "order-docx")]
#[command(version, about = "Render shop orders into Word templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render an order into a template
    Render {
        /// Template (.docx); overrides the template in the settings file
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Order as JSON
        #[arg(short, long)]
        order: PathBuf,

        /// Document settings as JSON
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write to the temporary directory under a unique name instead
        #[arg(long, conflicts_with = "out")]
        download: bool,
    },

    /// List the placeholders a template uses
    Variables {
        #[arg(short, long)]
        template: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter invoice template
    Init {
        /// Path of the new template
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
