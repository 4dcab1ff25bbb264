use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::warn;
use pacstat_exp::run_batch;

use super::load_pipeline;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// YAML pipeline configuration; the built-in layout is used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override the results root directory.
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Restrict the run to these domains (repeatable).
    #[arg(long = "domain", value_name = "NAME")]
    pub domains: Vec<String>,
    /// Write the JSON batch report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

pub fn run(args: &MergeArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_pipeline(args.config.as_ref(), args.root.as_ref())?;
    if !args.domains.is_empty() {
        for domain in &args.domains {
            if !config.domains.contains(domain) {
                warn!("{domain} is not part of the configured domain list");
            }
        }
        config.domains = args.domains.clone();
    }
    let report = run_batch(&config);
    if let Some(path) = &args.report {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(&report)?)?;
    }
    if report.is_success() {
        Ok(())
    } else {
        Err(format!(
            "{} of {} domains failed",
            report.failed(),
            report.outcomes.len()
        )
        .into())
    }
}
