//! End-to-end tests of the `qbench` binary.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn qbench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qbench"))
        .args(args)
        .env_remove("QBENCH_GPU_ENGINE")
        .env_remove("QBENCH_OUTPUT_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn qbench")
}

fn read_lines(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_max_below_min_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");

    let output = qbench(&[
        "run",
        "--min-qubits",
        "8",
        "--max-qubits",
        "4",
        "--output-dir",
        out.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid sweep range"));
    assert!(!out.exists());
}

#[test]
fn test_cpu_sweep_writes_one_record_per_qubit_count() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();

    let output = qbench(&[
        "run",
        "--min-qubits",
        "2",
        "--max-qubits",
        "6",
        "--step",
        "2",
        "--depth",
        "10",
        "--seed",
        "42",
        "--backends",
        "cpu",
        "--output-dir",
        out,
        "--run-name",
        "cpu_only",
        "--save-csv",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let lines = read_lines(&dir.path().join("cpu_only.jsonl"));
    let qubits: Vec<u64> = lines.iter().map(|l| l["qubit_count"].as_u64().unwrap()).collect();
    assert_eq!(qubits, vec![2, 4, 6]);
    for line in &lines {
        assert_eq!(line["device"], "cpu");
        assert_eq!(line["acceleration_mode"], Value::Null);
        assert_eq!(line["precision"], "double");
        assert_eq!(line["status"], "ok");
        assert!(line["elapsed_seconds"].as_f64().unwrap() > 0.0);
    }

    let summary: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("cpu_only.summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["counts"]["succeeded"], 3);
    assert_eq!(summary["interrupted"], false);

    let csv = std::fs::read_to_string(dir.path().join("cpu_only.csv")).unwrap();
    assert!(csv.starts_with("qubit_count,cpu_time,cpu_std\n"));
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn test_missing_gpu_engine_fails_gpu_runs_only() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let engine = dir.path().join("no_such_engine.so");

    let output = qbench(&[
        "run",
        "--min-qubits",
        "2",
        "--max-qubits",
        "3",
        "--step",
        "1",
        "--depth",
        "2",
        "--backends",
        "cpu,gpu-default",
        "--gpu-engine",
        engine.to_str().unwrap(),
        "--output-dir",
        out,
        "--run-name",
        "no_gpu",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let lines = read_lines(&dir.path().join("no_gpu.jsonl"));
    assert_eq!(lines.len(), 4);
    for line in &lines {
        match line["device"].as_str().unwrap() {
            "cpu" => assert_eq!(line["status"], "ok"),
            "gpu" => {
                assert_eq!(line["status"], "failed");
                assert_eq!(line["acceleration_mode"], "default");
                assert_eq!(line["elapsed_seconds"], Value::Null);
                assert_eq!(line["error_kind"], "unavailable");
                assert!(line["error_detail"].as_str().unwrap().contains("no_such_engine"));
            }
            other => panic!("unexpected device {other}"),
        }
    }
}

#[test]
fn test_rerun_with_same_name_does_not_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let args = [
        "run",
        "--min-qubits",
        "1",
        "--max-qubits",
        "2",
        "--step",
        "1",
        "--backends",
        "cpu",
        "--output-dir",
        out,
        "--run-name",
        "again",
    ];

    assert!(qbench(&args).status.success());
    assert!(qbench(&args).status.success());
    assert_eq!(read_lines(&dir.path().join("again.jsonl")).len(), 2);
}

#[test]
fn test_unknown_gate_is_rejected() {
    let output = qbench(&["run", "--gates", "h,bogus", "--backends", "cpu"]);
    assert!(!output.status.success());
}

// ============================================================================
// Other subcommands
// ============================================================================

#[test]
fn test_summarize_recorded_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let run = qbench(&[
        "run",
        "--min-qubits",
        "2",
        "--max-qubits",
        "2",
        "--backends",
        "cpu",
        "--precision",
        "single",
        "--output-dir",
        out,
        "--run-name",
        "tiny",
    ]);
    assert!(run.status.success());

    let file = dir.path().join("tiny.jsonl");
    let output = qbench(&["summarize", file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cpu"));
    assert!(stdout.contains("1 succeeded"));

    let output = qbench(&["summarize", file.to_str().unwrap(), "--baseline", "tpu"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_summarize_missing_file() {
    let output = qbench(&["summarize", "/nonexistent/run.jsonl"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_backends_lists_all_configurations() {
    let output = qbench(&["backends", "--gpu-engine", "/nonexistent/libengine.so"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for label in ["cpu", "gpu_default", "gpu_custatevec"] {
        assert!(stdout.contains(label), "missing {label}");
    }
}

#[test]
fn test_version() {
    let output = qbench(&["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
