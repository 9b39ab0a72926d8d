use std::{fs, path::Path};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/data.js");
const COMMIT: &str = include_str!("fixtures/commit.json");
const TIMINGS: &str = include_str!("fixtures/timings.txt");

/// A scratch directory holding a copy of the fixture data file. The command
/// runs inside it so no stray `perfdata.toml` or `.env` is picked up.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.js"), FIXTURE).unwrap();
    dir
}

fn perfdata(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("perfdata").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env("PERFDATA_DATA_FILE", "data.js");
    cmd
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn summary_lists_suites() {
    let dir = workspace();
    let output = perfdata(dir.path()).arg("summary").output().unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("repository:  https://github.com/414owen/lang-c"));
    assert!(text.contains("Language Compiler Benchmark: 2 entries"));
    assert!(text.contains("2cf275b"));
    assert!(text.contains("feat: arena allocate parse nodes"));
}

#[test]
fn validate_clean_file() {
    let dir = workspace();
    let output = perfdata(dir.path()).arg("validate").output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("no issues found"));
}

#[test]
fn validate_reports_duplicate_commits() {
    let dir = workspace();
    let duplicated = FIXTURE.replace(
        "ac845140b7282d385ef6b9a5fd0f8875497c7c65",
        "2cf275b0853d99746d383a10bd3fc9aa5d5d221c",
    );
    fs::write(dir.path().join("data.js"), duplicated).unwrap();

    let output = perfdata(dir.path()).arg("validate").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("error [Language Compiler Benchmark]"));
}

#[test]
fn compare_latest_flags_regression() {
    let dir = workspace();
    let output = perfdata(dir.path()).arg("compare").output().unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.starts_with("# Benchmarks\n"));
    assert!(text.contains("| Time spent parsing | 30.000ms (+20.000ms) | +200.00 % | DECLINED |"));
    assert!(text.contains("| Total tokens produced | 362_014 (+0) | +0.00 % | IMPROVED |"));
    assert!(text.contains("## Possible regressions"));
}

#[test]
fn compare_fails_on_alert_when_configured() {
    let dir = workspace();
    let output = perfdata(dir.path())
        .arg("compare")
        .env("PERFDATA_FAIL_ON_ALERT", "true")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let output = perfdata(dir.path())
        .args(["compare", "--threshold", "5"])
        .env("PERFDATA_FAIL_ON_ALERT", "true")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!stdout(&output).contains("Possible regressions"));
}

#[test]
fn compare_oldest_commit_by_prefix() {
    let dir = workspace();
    let output = perfdata(dir.path())
        .args(["compare", "--commit", "2cf2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Previous: none\n"));
    assert!(text.contains("| Time spent parsing | 10.000ms (-) | - | NEW |"));
}

#[test]
fn compare_unknown_commit_is_an_error() {
    let dir = workspace();
    let output = perfdata(dir.path())
        .args(["compare", "--commit", "ffff"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn history_as_csv() {
    let dir = workspace();
    let output = perfdata(dir.path())
        .args(["history", "Time spent parsing", "--format", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "commit,date,value,unit\n\
         2cf275b0853d99746d383a10bd3fc9aa5d5d221c,1676674398000,10000000,ns\n\
         ac845140b7282d385ef6b9a5fd0f8875497c7c65,1678533046402,30000000,ns\n"
    );
}

#[test]
fn history_of_unknown_bench_fails() {
    let dir = workspace();
    let output = perfdata(dir.path())
        .args(["history", "Time spent dreaming"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn timings_report_to_json() {
    let dir = workspace();
    fs::write(dir.path().join("timings.txt"), TIMINGS).unwrap();

    let output = perfdata(dir.path())
        .args(["timings", "timings.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let benches: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let benches = benches.as_array().unwrap();
    assert_eq!(benches.len(), 19);
    assert_eq!(benches[0]["name"], "Time spent tokenizing");
    assert_eq!(benches[0]["value"], 5_659_746);
    assert_eq!(benches[9]["name"], "Parse time per token token");
    assert_eq!(benches[13]["value"], 21742.13);
}

#[test]
fn append_timings_then_replace() {
    let dir = workspace();
    fs::write(dir.path().join("commit.json"), COMMIT).unwrap();
    fs::write(dir.path().join("timings.txt"), TIMINGS).unwrap();

    let append = |dir: &Path| {
        perfdata(dir)
            .args([
                "append",
                "--commit",
                "commit.json",
                "--timings",
                "timings.txt",
                "--date",
                "1678608000000",
            ])
            .output()
            .unwrap()
    };

    let output = append(dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("added 4a201ae in 'Language Compiler Benchmark'"));

    let output = append(dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("replaced 4a201ae"));

    let written = fs::read_to_string(dir.path().join("data.js")).unwrap();
    assert!(written.starts_with("window.BENCHMARK_DATA = {\n  \"lastUpdate\": "));
    assert!(!written.ends_with('\n'));
    assert_eq!(written.matches("\"id\": \"4a201aeed18f6450fbb200e7fa6a1827e72658a8\"").count(), 1);
    assert!(written.contains("\"Parse time per token token\""));

    let output = perfdata(dir.path()).arg("summary").output().unwrap();
    assert!(stdout(&output).contains("Language Compiler Benchmark: 3 entries"));
}

#[test]
fn append_benches_from_stdin_into_a_new_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("commit.json"), COMMIT).unwrap();

    let output = perfdata(dir.path())
        .args([
            "append",
            "--commit",
            "commit.json",
            "--benches",
            "-",
            "--suite",
            "Smoke",
            "--data-file",
            "bench/data.js",
        ])
        .env("PERFDATA_REPO_URL", "https://github.com/414owen/lang-c")
        .write_stdin(r#"[{"name": "Time spent parsing", "value": 1200, "unit": "ns"}]"#)
        .output()
        .unwrap();
    assert!(output.status.success());

    let written = fs::read_to_string(dir.path().join("bench/data.js")).unwrap();
    assert!(written.contains("\"repoUrl\": \"https://github.com/414owen/lang-c\""));
    assert!(written.contains("\"Smoke\": ["));
    assert!(written.contains("\"value\": 1200"));
}

#[test]
fn append_rejects_duplicate_bench_names() {
    let dir = workspace();
    fs::write(dir.path().join("commit.json"), COMMIT).unwrap();

    let output = perfdata(dir.path())
        .args(["append", "--commit", "commit.json", "--benches", "-"])
        .write_stdin(
            r#"[{"name": "a", "value": 1, "unit": "ns"}, {"name": "a", "value": 2, "unit": "ns"}]"#,
        )
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(fs::read_to_string(dir.path().join("data.js")).unwrap(), FIXTURE);
}

#[test]
fn merge_snapshots_into_one_file() {
    let dir = workspace();
    let older = FIXTURE.replace(
        "ac845140b7282d385ef6b9a5fd0f8875497c7c65",
        "0c0ffee0853d99746d383a10bd3fc9aa5d5d221c",
    );
    fs::write(dir.path().join("older.js"), older).unwrap();

    let output = perfdata(dir.path())
        .args(["merge", "older.js", "data.js", "-o", "merged.js"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("merged 2 snapshots into merged.js (3 entries)"));

    let output = perfdata(dir.path())
        .args(["validate", "--data-file", "merged.js"])
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn workload_program() {
    let dir = tempfile::tempdir().unwrap();
    let output = perfdata(dir.path())
        .args(["workload", "--functions", "3", "--statements", "10", "--seed", "9"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let program = stdout(&output);
    assert!(program.starts_with("(sig test-fn-0 (Fn I32 I32 I32))\n"));
    assert!(program.ends_with("(fun entry () (test-fn-2 42 101))"));
}

#[test]
fn missing_data_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = perfdata(dir.path()).arg("summary").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn append_reads_stdin_for_one_input_only() {
    let dir = workspace();
    let output = perfdata(dir.path())
        .args(["append", "--commit", "-", "--benches", "-"])
        .write_stdin(COMMIT)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("can read stdin"));
    assert_eq!(fs::read_to_string(dir.path().join("data.js")).unwrap(), FIXTURE);
}

#[test]
fn append_rejects_a_zero_entry_limit() {
    let dir = workspace();
    fs::write(dir.path().join("commit.json"), COMMIT).unwrap();
    fs::write(dir.path().join("timings.txt"), TIMINGS).unwrap();

    let output = perfdata(dir.path())
        .args([
            "append",
            "--commit",
            "commit.json",
            "--timings",
            "timings.txt",
            "--max-items",
            "0",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("data.js")).unwrap(), FIXTURE);

    let output = perfdata(dir.path())
        .args([
            "append",
            "--commit",
            "commit.json",
            "--timings",
            "timings.txt",
            "--max-items",
            "1",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let output = perfdata(dir.path()).arg("summary").output().unwrap();
    assert!(stdout(&output).contains("Language Compiler Benchmark: 1 entries"));
}

#[test]
fn log_filter_from_dotenv_file() {
    let dir = workspace();
    fs::write(dir.path().join(".env"), "RUST_LOG=perfdata=debug\n").unwrap();

    let output = perfdata(dir.path()).arg("summary").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("loaded benchmark data"));
}
