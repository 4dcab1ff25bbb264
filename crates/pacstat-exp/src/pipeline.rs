use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{error, info};
use pacstat_core::{PacError, Table};
use serde::{Deserialize, Serialize};

use crate::baseline::annotate_baseline;
use crate::config::PipelineConfig;
use crate::gains::{compute_gains, GainReport};
use crate::merge::merge;

/// Summary of one successfully processed domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    pub output: PathBuf,
    /// Records loaded per source name.
    pub sources: BTreeMap<String, usize>,
    pub columns: usize,
    pub gains: GainReport,
}

/// Result of one domain within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DomainOutcome {
    Completed(DomainReport),
    Failed { domain: String, error: PacError },
}

impl DomainOutcome {
    pub fn domain(&self) -> &str {
        match self {
            DomainOutcome::Completed(report) => &report.domain,
            DomainOutcome::Failed { domain, .. } => domain,
        }
    }
}

/// Outcomes of every domain in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<DomainOutcome>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, DomainOutcome::Completed(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs the configured delta-zero baseline step for `domain`, if any.
pub fn run_baseline(config: &PipelineConfig, domain: &str) -> Result<Option<PathBuf>, PacError> {
    let Some(job) = &config.baseline else {
        return Ok(None);
    };
    let input = config.resolve(&job.input, domain);
    let output = config.resolve(&job.output, domain);
    let table = Table::load(crate::columns::BASIC, &input)?;
    let annotated = annotate_baseline(&table, &job.columns)?;
    annotated.save(&output)?;
    info!(
        "{domain}: baseline {} -> {}",
        input.display(),
        output.display()
    );
    Ok(Some(output))
}

/// Loads, merges, computes gains and saves one domain.
///
/// The output file is written only after the full table has been built.
pub fn run_domain(config: &PipelineConfig, domain: &str) -> Result<DomainReport, PacError> {
    run_baseline(config, domain)?;
    let mut tables = Vec::with_capacity(config.sources.len());
    let mut sources = BTreeMap::new();
    for source in &config.sources {
        let path = config.resolve(&source.path, domain);
        let table = Table::load(source.name.clone(), &path)?;
        info!(
            "{domain}: loaded {} {} records from {}",
            table.len(),
            source.name,
            path.display()
        );
        sources.insert(source.name.clone(), table.len());
        tables.push(table);
    }

    let mut merged = merge(&tables, &config.merge)?;
    drop(tables);
    let gains = compute_gains(&mut merged, &config.gains)?;
    let output = config.output_path(domain);
    merged.save(&output)?;
    info!(
        "{domain}: wrote {} records to {}",
        merged.len(),
        output.display()
    );
    Ok(DomainReport {
        domain: domain.to_string(),
        output,
        sources,
        columns: merged.headers().len(),
        gains,
    })
}

/// Runs every configured domain, isolating failures.
///
/// A failing domain is logged and recorded; the remaining domains still run.
pub fn run_batch(config: &PipelineConfig) -> BatchReport {
    let mut report = BatchReport::default();
    for domain in &config.domains {
        let outcome = match run_domain(config, domain) {
            Ok(domain_report) => DomainOutcome::Completed(domain_report),
            Err(err) => {
                error!("{domain}: {err}");
                DomainOutcome::Failed {
                    domain: domain.clone(),
                    error: err,
                }
            }
        };
        report.outcomes.push(outcome);
    }
    info!(
        "batch finished: {} completed, {} failed",
        report.completed(),
        report.failed()
    );
    report
}
