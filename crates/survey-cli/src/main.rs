use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod cli;
mod cmd;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    cli::main()
}
