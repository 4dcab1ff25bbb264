use std::fs;

use pacstat_core::{union_headers, Cell, PacError, Record, Table};
use proptest::prelude::*;
use tempfile::tempdir;

fn as_text(record: &Record) -> Vec<(String, String)> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

#[test]
fn save_then_load_reproduces_records() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("table.csv");
    let mut table = Table::new(
        "Merged",
        vec!["InstanceID".into(), "epsilon".into(), "Expanded".into(), "HasGainDPS".into()],
    );
    let mut record = Record::new();
    record.insert("InstanceID".into(), Cell::from("42"));
    record.insert("epsilon".into(), Cell::Float(0.1));
    record.insert("Expanded".into(), Cell::Int(100));
    record.insert("HasGainDPS".into(), Cell::Missing);
    table.append(record.clone());
    table.save(&path).expect("save");

    let loaded = Table::load("Merged", &path).expect("load");
    assert_eq!(loaded.headers(), table.headers());
    assert_eq!(loaded.len(), 1);
    assert_eq!(as_text(&loaded.records()[0]), as_text(&record));
    assert_eq!(loaded.records()[0]["HasGainDPS"], Cell::Missing);
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "staging file must not survive a save");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().expect("tempdir");
    let err = Table::load("Basic", dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, PacError::Io(_)));
    assert!(err.info().context["path"].ends_with("absent.csv"));
}

#[test]
fn unwritable_destination_is_io_error() {
    let dir = tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let table = Table::new("t", vec!["a".into()]);
    let err = table.save(blocker.join("out.csv")).unwrap_err();
    assert!(matches!(err, PacError::Io(_)));
}

#[test]
fn malformed_file_reports_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.csv");
    fs::write(&path, "a,b\n1\n").unwrap();
    let err = Table::load("Basic", &path).unwrap_err();
    assert!(matches!(err, PacError::Format(_)));
    assert!(err.info().context.contains_key("path"));
}

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._-]{1,8}"
}

proptest! {
    #[test]
    fn roundtrip_is_stable(columns in prop::collection::btree_set("[a-z]{1,6}", 1..6), rows in prop::collection::vec(prop::collection::vec(field(), 6), 0..12)) {
        let headers: Vec<String> = columns.into_iter().collect();
        let mut table = Table::new("p", headers.clone());
        for row in &rows {
            let record: Record = headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.clone(), Cell::from_field(value)))
                .collect();
            table.append(record);
        }
        let mut bytes = Vec::new();
        table.to_writer(&mut bytes).unwrap();
        let loaded = Table::from_reader("p", bytes.as_slice()).unwrap();
        prop_assert_eq!(loaded.headers(), table.headers());
        prop_assert_eq!(loaded.records(), table.records());
    }

    #[test]
    fn union_covers_every_header(left in prop::collection::vec("[a-e]", 0..5), right in prop::collection::vec("[c-h]", 0..5)) {
        let mut a = Table::new("a", Vec::new());
        left.iter().for_each(|column| a.push_header(column.clone()));
        let mut b = Table::new("b", Vec::new());
        right.iter().for_each(|column| b.push_header(column.clone()));
        let union = union_headers(&[a.clone(), b.clone()], &["AlgName"]);
        for column in a.headers().iter().chain(b.headers()) {
            prop_assert!(union.contains(column));
        }
        let mut deduped = union.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), union.len());
    }
}
