use clap::Parser;

use s3cache::lifecycle::{self, fatal_error, guard, ProductionStages};
use s3cache::CliArgs;

#[tokio::main]
async fn main() {
    // Before anything else: faults from any thread or task end the process.
    guard::install();

    let args = CliArgs::parse();

    if let Err(e) = lifecycle::run(&ProductionStages, &args).await {
        fatal_error(e);
    }
}
