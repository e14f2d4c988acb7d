//! The `coursepath` binary.

use clap::Parser;
use coursepath_cli::{CliArgs, CoursepathCli};

#[tokio::main]
async fn main() -> coursepath_core::Result<()> {
    let args = CliArgs::parse();
    let cli = CoursepathCli::from_args("coursepath", &args)?;
    cli.run(args).await
}
