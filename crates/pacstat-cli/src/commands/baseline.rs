use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use pacstat_core::Table;
use pacstat_exp::columns::BASIC;
use pacstat_exp::{annotate_baseline, BaselineConfig};

#[derive(Args, Debug)]
pub struct BaselineArgs {
    /// Basic conditions summary produced by the experiment runner.
    #[arg(long)]
    pub input: PathBuf,
    /// Destination of the annotated table.
    #[arg(long)]
    pub output: PathBuf,
    /// Name of the appended column.
    #[arg(long, default_value = "expandedFMin")]
    pub column: String,
}

pub fn run(args: &BaselineArgs) -> Result<(), Box<dyn Error>> {
    let config = BaselineConfig {
        output_column: args.column.clone(),
        ..BaselineConfig::default()
    };
    let table = Table::load(BASIC, &args.input)?;
    let annotated = annotate_baseline(&table, &config)?;
    annotated.save(&args.output)?;
    Ok(())
}
