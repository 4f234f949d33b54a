use anyhow::Error;
use clap::Parser;
use epoch_miner_analyzer::{runner, utils};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Plots miner rotation and block size around a target block")]
struct Args {
    /// Name of the block dump in the input directory, without the `.json` extension
    identifier: Option<String>,
}

fn main() -> Result<(), Error> {
    utils::logging::init_logging();
    let args = Args::parse();

    info!("📈 Starting epoch miner analyzer v{}", env!("CARGO_PKG_VERSION"));

    let config = utils::config::Config::read_env_variables()?;
    let output = runner::run(&config, args.identifier.as_deref())?;

    info!("Chart written to {}, open it in a browser to explore", output.display());
    Ok(())
}
