use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{self, run::RunArgs, schema::SchemaArgs};

#[derive(Parser, Debug)]
#[command(
    name = "survey",
    about = "Answer surveys from a schema document in the terminal",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a survey interactively, one question per page
    Run(RunArgs),
    /// Print the JSON Schema survey documents are validated against
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => cmd::run::run(args),
        Commands::Schema(args) => cmd::schema::run(args),
    }
}
