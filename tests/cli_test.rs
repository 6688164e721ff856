use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn run_harvester(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_entityfacts-pictures-harvester"))
        .args(args)
        .env("RUST_LOG", "entityfacts_pictures_harvester=info")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    child.wait_with_output().unwrap()
}

#[test]
fn test_missing_directory_option_fails() {
    let output = run_harvester(&[], "");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--entityfacts-pictures-dir"));
}

#[test]
fn test_nonexistent_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing");

    let output = run_harvester(
        &["--entityfacts-pictures-dir", missing.to_str().unwrap()],
        "",
    );

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_empty_input_succeeds() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_harvester(
        &["-entityfacts-pictures-dir", temp_dir.path().to_str().unwrap()],
        "",
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("harvesting done"));
}

#[test]
fn test_skipped_records_still_succeed() {
    let temp_dir = TempDir::new().unwrap();
    let input = "{\"@id\": \"http://hub.culturegraph.org/entityfacts/118540238\"}\n";

    let output = run_harvester(
        &["--entityfacts-pictures-dir", temp_dir.path().to_str().unwrap()],
        input,
    );

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no depiction information for GND identifier '118540238'"));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_malformed_input_exits_non_zero() {
    let temp_dir = TempDir::new().unwrap();
    let input = "{\"@id\": \"http://hub.culturegraph.org/entityfacts/1\"}\nthis is not json\n";

    let output = run_harvester(
        &["--entityfacts-pictures-dir", temp_dir.path().to_str().unwrap()],
        input,
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Malformed record on line 2"));
}

#[test]
fn test_blank_line_exits_non_zero() {
    let temp_dir = TempDir::new().unwrap();
    let input = "{\"@id\": \"http://hub.culturegraph.org/entityfacts/1\"}\n\n";

    let output = run_harvester(
        &["--entityfacts-pictures-dir", temp_dir.path().to_str().unwrap()],
        input,
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Malformed record on line 2"));
}
