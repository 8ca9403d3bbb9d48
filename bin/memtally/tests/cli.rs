use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn memtally(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_memtally"))
        .args(args)
        .env_remove("MEMTALLY_PROFILE")
        .output()
        .expect("Could not launch memtally")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn text_trace_produces_the_report() {
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("regions.txt");
    let trace = directory.path().join("trace.txt");
    let output = directory.path().join("report.txt");

    fs::write(&input, "2, 2000, 16\n1, 1000, 16\n").unwrap();
    fs::write(&trace, "# reads then writes\nR 1000 4\nR 0x3e8 8\nW 1012 4\nR 5000 1\n").unwrap();

    let result = memtally(&["-i", path_str(&input), "-o", path_str(&output), "-t", path_str(&trace)]);

    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Store ID: 1, reads: 2, (over)writes: 1\nStore ID: 2, reads: 0, (over)writes: 0\n"
    );

    let log = String::from_utf8_lossy(&result.stderr);
    let begin = log.find("report begin").unwrap();
    let line = log.find("Store ID: 1, reads: 2").unwrap();
    let end = log.find("report end").unwrap();
    assert!(begin < line && line < end);
}

#[test]
fn recorded_log_replays_to_the_same_report() {
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("regions.txt");
    let trace = directory.path().join("trace.txt");
    let recording = directory.path().join("trace.accesslog");
    let first = directory.path().join("first.txt");
    let second = directory.path().join("second.txt");

    fs::write(&input, "1, 1000, 16\n").unwrap();
    fs::write(&trace, "R 1000 4\nW 1004 4\nW 1015 8\n").unwrap();

    let recorded = memtally(&[
        "-i", path_str(&input), "-o", path_str(&first), "-t", path_str(&trace), "--record", path_str(&recording),
    ]);
    assert!(recorded.status.success());

    let replayed = memtally(&[
        "-i", path_str(&input), "-o", path_str(&second), "-t", path_str(&recording), "--trace-format", "binary",
    ]);
    assert!(replayed.status.success());

    assert_eq!(fs::read_to_string(&first).unwrap(), "Store ID: 1, reads: 1, (over)writes: 2\n");
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn missing_output_option_fails_with_usage() {
    let result = memtally(&["-i", "regions.txt"]);

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Usage"));
}

#[test]
fn unopenable_artifact_fails() {
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("regions.txt");
    let trace = directory.path().join("trace.txt");
    let output = directory.path().join("missing").join("report.txt");

    fs::write(&input, "1, 1000, 16\n").unwrap();
    fs::write(&trace, "R 1000 4\n").unwrap();

    let result = memtally(&["-i", path_str(&input), "-o", path_str(&output), "-t", path_str(&trace)]);

    assert!(!result.status.success());
    assert!(!String::from_utf8_lossy(&result.stderr).contains("report begin"));
}

#[test]
fn strict_mode_rejects_malformed_descriptors() {
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("regions.txt");
    let trace = directory.path().join("trace.txt");
    let output = directory.path().join("report.txt");

    fs::write(&input, "1, 1000\n").unwrap();
    fs::write(&trace, "").unwrap();

    let strict = memtally(&["-i", path_str(&input), "-o", path_str(&output), "-t", path_str(&trace), "--strict"]);
    assert!(!strict.status.success());
    assert!(!output.exists());

    let permissive = memtally(&["-i", path_str(&input), "-o", path_str(&output), "-t", path_str(&trace)]);
    assert!(permissive.status.success());
    assert_eq!(fs::read_to_string(&output).unwrap(), "Store ID: 1, reads: 0, (over)writes: 0\n");
}
