//! Binary-level tests for the command line

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn extractor() -> Command {
    Command::new(env!("CARGO_BIN_EXE_skillbridge-extractor"))
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = extractor()
        .args(args)
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
fn test_help_lists_commands() {
    let output = extractor().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("extract"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("--legacy-paging"));
}

#[test]
fn test_version_flag() {
    let output = extractor().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_empty_prompt_answer_exits_nonzero() {
    let output = run_with_stdin(&["--no-progress", "extract"], "\n");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Enter Job Family exactly as shown on the SkillBridge site:"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No job family entered"));
}

#[test]
fn test_invalid_max_retries_rejected() {
    let output = extractor()
        .args(["--max-retries", "0", "extract", "--category", "Healthcare"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}
