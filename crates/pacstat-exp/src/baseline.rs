use std::collections::BTreeMap;

use log::{debug, info, warn};
use pacstat_core::{Cell, ErrorInfo, PacError, Record, Table};

use crate::config::BaselineConfig;
use crate::key::ExperimentKey;

/// Appends the delta-zero expansion count to every row of a conditions summary.
///
/// Rows run with `delta == 0` act as the baseline for their
/// `(instance, epsilon, condition)` triple. Every row, baseline or not,
/// receives the baseline's `Expanded` value in `config.output_column`, or
/// [`Cell::Missing`] when its triple has no delta-zero run.
pub fn annotate_baseline(table: &Table, config: &BaselineConfig) -> Result<Table, PacError> {
    let mut baselines: BTreeMap<(ExperimentKey, String), Cell> = BTreeMap::new();
    let mut keys = Vec::with_capacity(table.len());
    for (row, record) in table.records().iter().enumerate() {
        let key = baseline_key(record, row, config)?;
        let delta = numeric(record, &config.delta_column, row)?;
        if delta == 0.0 {
            let expanded = record
                .get(&config.expanded_column)
                .cloned()
                .unwrap_or(Cell::Missing);
            if baselines.insert(key.clone(), expanded).is_some() {
                debug!("row {} replaces an earlier delta-zero baseline", row + 1);
            }
        }
        keys.push(key);
    }

    let mut headers = table.headers().to_vec();
    headers.push(config.output_column.clone());
    let mut annotated = Table::new(table.name(), headers);
    let mut unmatched = 0usize;
    for (record, key) in table.records().iter().zip(&keys) {
        let baseline = baselines.get(key).cloned().unwrap_or_else(|| {
            unmatched += 1;
            Cell::Missing
        });
        let mut record = record.clone();
        record.insert(config.output_column.clone(), baseline);
        annotated.append(record);
    }
    if unmatched > 0 {
        warn!("{unmatched} rows have no delta-zero baseline");
    }
    info!(
        "annotated {} rows against {} baselines",
        annotated.len(),
        baselines.len()
    );
    Ok(annotated)
}

fn baseline_key(
    record: &Record,
    row: usize,
    config: &BaselineConfig,
) -> Result<(ExperimentKey, String), PacError> {
    let epsilon = numeric(record, &config.epsilon_column, row)?;
    let instance = text(record, &config.instance_column, row)?;
    let condition = text(record, &config.condition_column, row)?;
    Ok((ExperimentKey::new(epsilon, instance), condition))
}

fn numeric(record: &Record, column: &str, row: usize) -> Result<f64, PacError> {
    record
        .get(column)
        .and_then(Cell::as_f64)
        .ok_or_else(|| field_error(record, column, row))
}

fn text(record: &Record, column: &str, row: usize) -> Result<String, PacError> {
    match record.get(column) {
        Some(Cell::Missing) | None => Err(field_error(record, column, row)),
        Some(cell) => Ok(cell.to_string()),
    }
}

fn field_error(record: &Record, column: &str, row: usize) -> PacError {
    let value = record
        .get(column)
        .map(ToString::to_string)
        .unwrap_or_else(|| "<absent>".to_string());
    PacError::Format(
        ErrorInfo::new("baseline-field", "conditions row cannot supply a baseline field")
            .with_context("column", column)
            .with_context("row", (row + 1).to_string())
            .with_context("value", value),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "\
InstanceID,Expanded,delta,epsilon,pacCondition
1,100,0.0,0.1,FMin
1,60,0.5,0.1,FMin
1,80,0.0,0.1,Oracle
2,40,0.5,0.1,FMin
";

    #[test]
    fn rows_pick_their_delta_zero_run() {
        let table = Table::from_reader("Basic", SUMMARY.as_bytes()).unwrap();
        let annotated = annotate_baseline(&table, &BaselineConfig::default()).unwrap();
        assert_eq!(annotated.headers().last().unwrap(), "expandedFMin");
        let values: Vec<String> = annotated
            .records()
            .iter()
            .map(|record| record["expandedFMin"].to_string())
            .collect();
        assert_eq!(values, ["100", "100", "80", "N/A"]);
    }

    #[test]
    fn non_numeric_delta_is_format_error() {
        let table = Table::from_reader(
            "Basic",
            "InstanceID,Expanded,delta,epsilon,pacCondition\n1,5,x,0.1,FMin\n".as_bytes(),
        )
        .unwrap();
        let err = annotate_baseline(&table, &BaselineConfig::default()).unwrap_err();
        assert!(matches!(err, PacError::Format(_)));
        assert_eq!(err.info().context["column"], "delta");
    }
}
