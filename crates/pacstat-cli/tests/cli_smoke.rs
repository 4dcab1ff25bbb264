use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

const FMIN: &str = "org.cs4j.core.algorithms.pac.FMinCondition";

fn pacstat() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pacstat"));
    command.env("RUST_LOG", "warn");
    command
}

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn merge_command_writes_output_and_report() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "basic/conditions-pancakes-gains.csv",
        &format!("InstanceID,Expanded,epsilon,pacCondition\n1,100,0.1,{FMIN}\n"),
    );
    write(root, "openBased/open-pancakes.csv", "InstanceID,Expanded,epsilon\n1,50,0.1\n");
    write(root, "dps/DPSpancakes.csv", "InstanceID,Expanded,weight\n1,25,1.1\n");
    write(root, "boundedCost/bc-pancakes.csv", "InstanceID,Expanded,epsilon\n1,20,0.1\n");
    let report = root.join("out/report.json");

    let status = pacstat()
        .args(["merge", "--domain", "pancakes", "--root"])
        .arg(root)
        .arg("--report")
        .arg(&report)
        .status()
        .expect("run pacstat");
    assert!(status.success());

    let merged = fs::read_to_string(root.join("merged-pancakes.csv")).unwrap();
    let header = merged.lines().next().unwrap();
    assert!(header.ends_with("GainFMin,GainOracle,GainDPS,HasGainFMin,HasGainOracle,HasGainDPS"));
    assert_eq!(merged.lines().count(), 5);
    let report_text = fs::read_to_string(report).unwrap();
    assert!(report_text.contains("\"completed\""));
}

#[test]
fn merge_command_fails_when_a_domain_fails() {
    let dir = tempdir().unwrap();
    let status = pacstat()
        .args(["merge", "--domain", "pancakes", "--root"])
        .arg(dir.path())
        .status()
        .expect("run pacstat");
    assert!(!status.success());
}

#[test]
fn baseline_command_appends_column() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("conditions.csv");
    fs::write(
        &input,
        format!("InstanceID,Expanded,delta,epsilon,pacCondition\n1,100,0.0,0.1,{FMIN}\n1,60,0.5,0.1,{FMIN}\n"),
    )
    .unwrap();
    let output = dir.path().join("gains.csv");
    let status = pacstat()
        .arg("baseline")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()
        .expect("run pacstat");
    assert!(status.success());
    let text = fs::read_to_string(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].ends_with(",expandedFMin"));
    assert!(lines[2].ends_with(",100"));
}

#[test]
fn config_command_prints_defaults() {
    let output = pacstat().arg("config").output().expect("run pacstat");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("weighted_source: DPS"));
    assert!(text.contains("GridPathFinding"));
}
