use std::error::Error;
use std::path::PathBuf;

use pacstat_exp::PipelineConfig;

pub mod baseline;
pub mod config;
pub mod merge;

/// Reads `path` when given, otherwise falls back to the built-in layout.
pub fn load_pipeline(
    path: Option<&PathBuf>,
    root: Option<&PathBuf>,
) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = root {
        config.results_root = root.clone();
    }
    Ok(config)
}
