use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn wordfinder() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wordfinder"))
}

#[test]
fn test_invalid_directory_exits_non_zero() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let output = wordfinder()
        .args(["-w", "cat", "-d"])
        .arg(&missing)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid directory"));
}

#[test]
fn test_invalid_directory_leaves_config_untouched() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("wordfinder.toml");

    let output = wordfinder()
        .args(["-w", "cat", "-d"])
        .arg(dir.path().join("missing"))
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid directory"));
    assert!(!config.exists());
}

#[test]
fn test_scan_prints_matches_and_writes_csv() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a.txt"), "cat cat dog").unwrap();
    fs::write(data.join("b.md"), "CAT").unwrap();
    fs::write(data.join("c.json"), "{\"pet\": \"cat\"}").unwrap();
    fs::write(data.join("broken.json"), "{ cat").unwrap();
    let csv_path = dir.path().join("report.csv");

    let output = wordfinder()
        .args(["-w", "cat", "-e", "txt,md", "-d"])
        .arg(&data)
        .arg("-o")
        .arg(&csv_path)
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("Searching for 'cat' in "));
    assert!(lines[0].ends_with("for extensions: md, txt"));
    assert!(stdout.contains("a.txt | 2 occurrence(s)"));
    assert!(stdout.contains("b.md | 1 occurrence(s)"));
    assert!(stdout.contains("Word found 3 times."));
    assert!(stdout.contains("Results written to"));
    // broken.json 被扩展名过滤, 不报错
    assert!(output.stderr.is_empty());

    let csv = fs::read_to_string(&csv_path).unwrap();
    let mut rows = csv.lines();
    assert_eq!(rows.next(), Some("file,extension,count"));
    assert_eq!(rows.count(), 2);
}

#[test]
fn test_decode_failure_is_reported_and_scan_continues() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("good.txt"), "Hello hello").unwrap();
    fs::write(dir.path().join("bad.json"), "{ \"hello\": ").unwrap();

    let output = wordfinder()
        .args(["-w", "Hello", "--case-sensitive", "-d"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("good.txt | 1 occurrence(s)"));
    assert!(stdout.contains("Word found 1 times."));
    assert!(stderr.contains("Error reading file"));
    assert!(stderr.contains("bad.json"));
}

#[test]
fn test_no_matches_still_succeeds() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "dog").unwrap();
    fs::write(dir.path().join("blob.bin"), "cat").unwrap();

    let output = wordfinder()
        .args(["-w", "cat", "-d"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Word found 0 times."));
    assert!(output.stderr.is_empty());
}
