use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/traces")
        .join(name)
}

fn csim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_csim"))
        .args(args)
        .current_dir(std::env::temp_dir())
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn prints_summary_for_yi_trace() {
    let yi = fixture("yi.trace");
    let output = csim(&["-s", "4", "-E", "1", "-b", "4", "-t", yi.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "hits:4 misses:5 evictions:3\n");
}

#[test]
fn verbose_echoes_each_record() {
    let yi = fixture("yi.trace");
    let output = csim(&["-v", "-s", "4", "-E", "1", "-b", "4", "-t", yi.to_str().unwrap()]);
    assert!(output.status.success());
    let out = stdout(&output);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "L 10,1 miss");
    assert_eq!(lines[6], "M 12,1 miss eviction hit");
    assert_eq!(lines[7], "hits:4 misses:5 evictions:3");
}

#[test]
fn zero_lines_per_set_fails() {
    let yi = fixture("yi.trace");
    let output = csim(&["-s", "4", "-E", "0", "-b", "4", "-t", yi.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid cache geometry"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn missing_geometry_argument_fails() {
    let yi = fixture("yi.trace");
    let output = csim(&["-s", "4", "-b", "4", "-t", yi.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("-E"));
}

#[test]
fn negative_bits_fail() {
    let yi = fixture("yi.trace");
    let output = csim(&["-s", "-1", "-E", "1", "-b", "4", "-t", yi.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid cache geometry"));
}

#[test]
fn oversized_geometry_fails_cleanly() {
    let yi = fixture("yi.trace");
    let output = csim(&["-s", "62", "-E", "1", "-b", "0", "-t", yi.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid cache geometry"));
}

#[test]
fn missing_trace_argument_fails() {
    let output = csim(&["-s", "4", "-E", "1", "-b", "4"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("-t"));
}

#[test]
fn unreadable_trace_fails() {
    let missing = fixture("no-such.trace");
    let output = csim(&["-s", "4", "-E", "1", "-b", "4", "-t", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no-such.trace"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn truncated_trace_reports_partial_counts() {
    let truncated = fixture("truncated.trace");
    let output = csim(&["-s", "0", "-E", "1", "-b", "0", "-t", truncated.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "hits:0 misses:2 evictions:1\n");
}

#[test]
fn several_traces_run_independently() {
    let yi = fixture("yi.trace");
    let ifetch = fixture("ifetch.trace");
    let output = csim(&[
        "-s", "4", "-E", "1", "-b", "4",
        "-t", yi.to_str().unwrap(),
        "-t", ifetch.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "yi.trace: hits:4 misses:5 evictions:3\nifetch.trace: hits:0 misses:0 evictions:0\n"
    );
}

#[test]
fn results_file_holds_the_three_counters() {
    let yi = fixture("yi.trace");
    let path = std::env::temp_dir().join(format!("csim-cli-results-{}", std::process::id()));
    let output = csim(&[
        "-s", "4", "-E", "2", "-b", "4",
        "-t", yi.to_str().unwrap(),
        "--results-file", path.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), "4 5 2\n");
    fs::remove_file(&path).unwrap();
}

#[test]
fn results_file_needs_a_single_trace() {
    let yi = fixture("yi.trace");
    let path = std::env::temp_dir().join(format!("csim-cli-refused-{}", std::process::id()));
    let output = csim(&[
        "-s", "4", "-E", "1", "-b", "4",
        "-t", yi.to_str().unwrap(),
        "-t", yi.to_str().unwrap(),
        "--results-file", path.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!path.exists());

    let output = csim(&[
        "-s", "4", "-E", "1", "-b", "4",
        "-t", yi.to_str().unwrap(),
        "--sweep-ways", "1,2",
        "--results-file", path.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!path.exists());
}

#[test]
fn help_explains_results_file() {
    let output = csim(&["-h"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("--results-file"));
    assert!(out.contains(".csim_results"));
}

#[test]
fn sweep_prints_one_section_per_list() {
    let yi = fixture("yi.trace");
    let output = csim(&[
        "-s", "4", "-E", "1", "-b", "4",
        "-t", yi.to_str().unwrap(),
        "--sweep-ways", "1,2",
    ]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("== Set-Associative Sweep =="));
    assert!(out.contains("Direct-Mapped"));
    assert!(out.contains("2-way SA"));
}
