use clap::Parser;

use dispensary_lib::cli::Cli;

#[tokio::main]
async fn main() {
    dispensary_lib::init_tracing();

    if let Err(e) = Cli::parse().run().await {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
