use std::collections::BTreeMap;

use log::{debug, info, warn};
use pacstat_core::{Cell, ErrorInfo, PacError, Record, Table};
use serde::{Deserialize, Serialize};

use crate::config::{DuplicatePolicy, GainConfig, ReferenceSpec};
use crate::key::ExperimentKey;

/// Reference expansion counts per experiment key.
///
/// Built in one pass over the merged table and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceIndex {
    entries: BTreeMap<ExperimentKey, BTreeMap<String, i64>>,
}

impl ReferenceIndex {
    /// Scans `table` and records the `Expanded` value of every reference match.
    pub fn build(table: &Table, config: &GainConfig) -> Result<Self, PacError> {
        let mut entries: BTreeMap<ExperimentKey, BTreeMap<String, i64>> = BTreeMap::new();
        for (row, record) in table.records().iter().enumerate() {
            let key = record_key(record, config)?;
            let slot = entries.entry(key.clone()).or_default();
            for reference in &config.references {
                if !matches_reference(record, reference, config) {
                    continue;
                }
                let expanded = expanded_of(record, config, row)?;
                if slot.contains_key(&reference.name) {
                    match config.duplicates {
                        DuplicatePolicy::Reject => {
                            return Err(PacError::Schema(
                                ErrorInfo::new(
                                    "gain-duplicate-reference",
                                    "more than one record matches a reference for the same key",
                                )
                                .with_context("reference", reference.name.clone())
                                .with_context("key", key.to_string())
                                .with_context("row", (row + 1).to_string())
                                .with_hint(
                                    "a delta sweep in the conditions file repeats every key; \
                                     set gains.duplicates to keep-first or keep-last",
                                ),
                            ))
                        }
                        DuplicatePolicy::KeepFirst => {
                            debug!("ignoring duplicate {} reference for {key}", reference.name);
                            continue;
                        }
                        DuplicatePolicy::KeepLast => {
                            debug!("replacing duplicate {} reference for {key}", reference.name);
                        }
                    }
                }
                slot.insert(reference.name.clone(), expanded);
            }
        }
        Ok(Self { entries })
    }

    /// Reference expansion count recorded under `key`, if any.
    pub fn get(&self, key: &ExperimentKey, reference: &str) -> Option<i64> {
        self.entries
            .get(key)
            .and_then(|references| references.get(reference))
            .copied()
    }

    /// Number of distinct experiment keys seen.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

/// Ratio of the reference expansion count to a record's own count.
///
/// A zero denominator is reported as [`PacError::Division`] instead of
/// producing an infinite or NaN ratio.
pub fn gain(reference_expanded: i64, expanded: i64) -> Result<f64, PacError> {
    if expanded == 0 {
        return Err(PacError::Division(
            ErrorInfo::new("gain-zero-expanded", "record expanded no nodes")
                .with_context("reference_expanded", reference_expanded.to_string()),
        ));
    }
    Ok(reference_expanded as f64 / expanded as f64)
}

/// Outcome of [`compute_gains`] for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainReport {
    /// Records augmented.
    pub records: usize,
    /// Distinct experiment keys in the table.
    pub keys: usize,
    /// Records per reference for which no reference run exists under their key.
    pub missing_references: BTreeMap<String, usize>,
    /// Records whose gains were left unset because they expanded no nodes.
    pub degenerate: Vec<ErrorInfo>,
}

/// Derived cells for a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct Augmentation {
    /// Gain cells followed by flag cells, in header order.
    pub cells: Vec<(String, Cell)>,
    /// References with no run under the record's key.
    pub missing: Vec<String>,
    /// First division failure hit while computing the ratios.
    pub degenerate: Option<ErrorInfo>,
}

/// Computes the derived gain cells of `record` against `index`.
pub fn augment(
    record: &Record,
    row: usize,
    index: &ReferenceIndex,
    config: &GainConfig,
) -> Result<Augmentation, PacError> {
    let key = record_key(record, config)?;
    let expanded = expanded_of(record, config, row)?;
    let mut ratios = Vec::with_capacity(config.references.len());
    let mut missing = Vec::new();
    let mut degenerate = None;
    for reference in &config.references {
        let ratio = match index.get(&key, &reference.name) {
            None => {
                missing.push(reference.name.clone());
                None
            }
            Some(reference_expanded) => match gain(reference_expanded, expanded) {
                Ok(ratio) => Some(ratio),
                Err(PacError::Division(info)) => {
                    if degenerate.is_none() {
                        degenerate = Some(
                            info.with_context("key", key.to_string())
                                .with_context("row", (row + 1).to_string()),
                        );
                    }
                    None
                }
                Err(other) => return Err(other),
            },
        };
        ratios.push(ratio);
    }

    let gains = config
        .references
        .iter()
        .zip(ratios.iter().copied())
        .map(|(reference, ratio)| {
            let cell = ratio.map_or(Cell::Missing, Cell::Float);
            (config.gain_column(reference), cell)
        });
    let flags = config
        .references
        .iter()
        .zip(ratios.iter().copied())
        .map(|(reference, ratio)| {
            let cell = ratio.map_or(Cell::Missing, |ratio| Cell::Bool(ratio > 1.0));
            (config.has_gain_column(reference), cell)
        });
    Ok(Augmentation {
        cells: gains.chain(flags).collect(),
        missing,
        degenerate,
    })
}

/// Adds `Gain<Ref>` and `HasGain<Ref>` columns to every record of `table`.
///
/// Runs in two passes: a [`ReferenceIndex`] is built over the whole table,
/// then each record is augmented against it. Missing references and zero
/// expansion counts leave the affected cells at [`Cell::Missing`] and are
/// listed in the returned report.
pub fn compute_gains(table: &mut Table, config: &GainConfig) -> Result<GainReport, PacError> {
    let index = ReferenceIndex::build(table, config)?;
    let augmentations = table
        .records()
        .iter()
        .enumerate()
        .map(|(row, record)| augment(record, row, &index, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = GainReport {
        records: table.len(),
        keys: index.key_count(),
        ..GainReport::default()
    };
    for (record, augmentation) in table.records_mut().iter_mut().zip(augmentations) {
        record.extend(augmentation.cells);
        for name in augmentation.missing {
            *report.missing_references.entry(name).or_default() += 1;
        }
        if let Some(info) = augmentation.degenerate {
            warn!("skipping gains for degenerate run: {info}");
            report.degenerate.push(info);
        }
    }
    for column in config.derived_columns() {
        table.push_header(column);
    }
    info!(
        "computed gains for {} records over {} keys",
        report.records, report.keys
    );
    Ok(report)
}

fn record_key(record: &Record, config: &GainConfig) -> Result<ExperimentKey, PacError> {
    ExperimentKey::from_record(record, &config.epsilon_column, &config.instance_column)
}

fn matches_reference(record: &Record, reference: &ReferenceSpec, config: &GainConfig) -> bool {
    let text_equals = |column: &str, expected: &str| {
        matches!(record.get(column), Some(Cell::Text(value)) if value == expected)
    };
    text_equals(&config.alg_column, &reference.algorithm)
        && reference
            .condition
            .as_deref()
            .map_or(true, |condition| text_equals(&config.condition_column, condition))
}

fn expanded_of(record: &Record, config: &GainConfig, row: usize) -> Result<i64, PacError> {
    record
        .get(&config.expanded_column)
        .and_then(Cell::as_i64)
        .ok_or_else(|| {
            PacError::Schema(
                ErrorInfo::new("gain-missing-expanded", "record has no integer expansion count")
                    .with_context("column", config.expanded_column.clone())
                    .with_context("row", (row + 1).to_string()),
            )
        })
}
