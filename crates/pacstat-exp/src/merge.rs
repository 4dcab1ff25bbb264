use log::{debug, info};
use pacstat_core::{union_headers, Cell, ErrorInfo, PacError, Record, Table};

use crate::columns::MERGED;
use crate::config::MergeConfig;

/// Merges per-algorithm tables into one table over the union of their columns.
///
/// Every output record carries the source table name in the algorithm tag
/// column and [`Cell::Missing`] for columns its source does not report. The
/// weighted source has its weight converted to an epsilon and the weight
/// column dropped. Epsilon and expansion counts are coerced to numbers on
/// every record so later joins compare values, not strings.
pub fn merge(tables: &[Table], config: &MergeConfig) -> Result<Table, PacError> {
    let has_weighted = tables
        .iter()
        .any(|table| table.name() == config.weighted_source);
    let mut extra = Vec::with_capacity(2);
    if has_weighted {
        extra.push(config.epsilon_column.as_str());
    }
    extra.push(config.alg_column.as_str());
    let mut headers = union_headers(tables, &extra);
    headers.retain(|header| header != &config.weight_column);
    debug!("merged header: {}", headers.join(","));

    let mut merged = Table::new(MERGED, headers);
    for table in tables {
        let weighted = table.name() == config.weighted_source;
        if weighted && !table.has_column(&config.weight_column) {
            return Err(PacError::Schema(
                ErrorInfo::new("merge-missing-weight", "weighted source has no weight column")
                    .with_context("source", table.name())
                    .with_context("column", config.weight_column.clone()),
            ));
        }
        for (row, record) in table.records().iter().enumerate() {
            let merged_record = merge_record(&merged, table.name(), row, record, weighted, config)?;
            merged.append(merged_record);
        }
        info!("merged {} records from {}", table.len(), table.name());
    }
    Ok(merged)
}

fn merge_record(
    merged: &Table,
    source: &str,
    row: usize,
    record: &Record,
    weighted: bool,
    config: &MergeConfig,
) -> Result<Record, PacError> {
    let mut out: Record = merged
        .headers()
        .iter()
        .map(|header| {
            let cell = if header == &config.alg_column {
                Cell::from(source)
            } else {
                record.get(header).cloned().unwrap_or(Cell::Missing)
            };
            (header.clone(), cell)
        })
        .collect();

    let epsilon = if weighted {
        let weight = require(record, &config.weight_column, source, row, Cell::as_f64)?;
        round_to(weight - 1.0, config.epsilon_decimals)
    } else {
        require(&out, &config.epsilon_column, source, row, Cell::as_f64)?
    };
    let expanded = require(&out, &config.expanded_column, source, row, Cell::as_i64)?;
    out.insert(config.epsilon_column.clone(), Cell::Float(epsilon));
    out.insert(config.expanded_column.clone(), Cell::Int(expanded));
    Ok(out)
}

/// Rounds to `decimals` places from the exact binary value, ties to even.
///
/// `round_to(1.115 - 1.0, 2)` is `0.11` and `round_to(0.125, 2)` is `0.12`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

fn require<T>(
    record: &Record,
    column: &str,
    source: &str,
    row: usize,
    coerce: impl Fn(&Cell) -> Option<T>,
) -> Result<T, PacError> {
    let cell = record.get(column);
    cell.and_then(coerce).ok_or_else(|| {
        let found = cell
            .map(ToString::to_string)
            .unwrap_or_else(|| "<absent>".to_string());
        PacError::Schema(
            ErrorInfo::new("merge-not-numeric", "column cannot be coerced to a number")
                .with_context("source", source)
                .with_context("row", (row + 1).to_string())
                .with_context("column", column)
                .with_context("value", found),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, text: &str) -> Table {
        Table::from_reader(name, text.as_bytes()).unwrap()
    }

    #[test]
    fn rounding_matches_two_decimals() {
        assert_eq!(round_to(1.25 - 1.0, 2), 0.25);
        assert_eq!(round_to(1.1 - 1.0, 2), 0.1);
        assert_eq!(round_to(2.0 - 1.0, 2), 1.0);
        assert_eq!(round_to(1.115 - 1.0, 2), 0.11);
        assert_eq!(round_to(1.125 - 1.0, 2), 0.12);
    }

    #[test]
    fn weights_off_the_grid_round_from_binary_value() {
        let basic = table("Basic", "InstanceID,epsilon,Expanded\n1,0.1,10\n");
        let dps = table("DPS", "InstanceID,Expanded,weight\n1,8,1.115\n2,9,1.125\n");
        let merged = merge(&[basic, dps], &MergeConfig::default()).unwrap();
        assert_eq!(merged.records()[1]["epsilon"], Cell::Float(0.11));
        assert_eq!(merged.records()[2]["epsilon"], Cell::Float(0.12));
    }

    #[test]
    fn weighted_source_alone_still_writes_epsilon() {
        let dps = table("DPS", "InstanceID,Expanded,weight\n1,8,1.5\n");
        let merged = merge(&[dps], &MergeConfig::default()).unwrap();
        assert_eq!(merged.headers(), ["InstanceID", "Expanded", "epsilon", "AlgName"]);
        let record = &merged.records()[0];
        assert_eq!(record.len(), merged.headers().len());
        assert_eq!(record["epsilon"], Cell::Float(0.5));

        let mut out = Vec::new();
        merged.to_writer(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1), Some("1,8,0.5,DPS"));
    }

    #[test]
    fn absent_columns_filled_with_sentinel() {
        let basic = table("Basic", "InstanceID,epsilon,Expanded,pacCondition\n1,0.1,10,c\n");
        let open = table("Open", "InstanceID,epsilon,Expanded,Cost\n1,0.1,12,5\n");
        let merged = merge(&[basic, open], &MergeConfig::default()).unwrap();
        assert_eq!(
            merged.headers(),
            ["InstanceID", "epsilon", "Expanded", "pacCondition", "Cost", "AlgName"]
        );
        assert_eq!(merged.records()[0]["Cost"], Cell::Missing);
        assert_eq!(merged.records()[1]["pacCondition"], Cell::Missing);
        assert_eq!(merged.records()[1]["AlgName"], Cell::from("Open"));
        assert_eq!(merged.records()[1]["Expanded"], Cell::Int(12));
    }

    #[test]
    fn source_alg_name_column_is_overwritten() {
        let basic = table("Basic", "InstanceID,epsilon,Expanded,AlgName\n1,0.1,10,PTS\n");
        let merged = merge(&[basic], &MergeConfig::default()).unwrap();
        assert_eq!(merged.records()[0]["AlgName"], Cell::from("Basic"));
        assert_eq!(merged.headers().iter().filter(|h| *h == "AlgName").count(), 1);
    }

    #[test]
    fn float_expanded_is_schema_error() {
        let basic = table("Basic", "InstanceID,epsilon,Expanded\n1,0.1,10.5\n");
        let err = merge(&[basic], &MergeConfig::default()).unwrap_err();
        assert!(matches!(err, PacError::Schema(_)));
        assert_eq!(err.info().context["column"], "Expanded");
        assert_eq!(err.info().context["value"], "10.5");
    }

    #[test]
    fn weighted_source_without_weight_rejected() {
        let dps = table("DPS", "InstanceID,epsilon,Expanded\n1,0.1,10\n");
        let err = merge(&[dps], &MergeConfig::default()).unwrap_err();
        assert_eq!(err.info().code, "merge-missing-weight");
    }
}
