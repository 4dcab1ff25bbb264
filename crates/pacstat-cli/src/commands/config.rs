use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::load_pipeline;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration to validate and print; defaults are printed when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &ConfigArgs) -> Result<(), Box<dyn Error>> {
    let config = load_pipeline(args.config.as_ref(), None)?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
