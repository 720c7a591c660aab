//! Tests for the code sandbox

use super::*;

fn shell_sandbox() -> CodeSandbox {
    CodeSandbox::new(
        SandboxConfig::default()
            .with_interpreter("sh")
            .with_script_suffix(".sh")
            .with_syntax_check(SyntaxCheck::Structural),
    )
}

async fn python_available() -> bool {
    tokio::process::Command::new("python3")
        .arg("--version")
        .output()
        .await
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[test]
fn test_deny_list_is_case_insensitive() {
    assert_eq!(find_denied_pattern("IMPORT SUBPROCESS"), Some("import subprocess"));
    assert_eq!(find_denied_pattern("x = eval('1')"), Some("eval("));
    assert_eq!(find_denied_pattern("print(sum([1, 2]))"), None);
}

#[test]
fn test_structure_accepts_valid_code() {
    let code = "def f(x):\n    return [x, {'a': (1, 2)}]\n\nprint(f(\"it's\"))  # done)\n";
    assert!(check_structure(code).is_ok());

    let doc = "s = \"\"\"multi\nline ' \" text\"\"\"\nprint(s)\n";
    assert!(check_structure(doc).is_ok());
}

#[test]
fn test_structure_rejects_unbalanced_brackets() {
    let err = check_structure("print((1 + 2)\n").unwrap_err();
    assert!(err.contains("was never closed"), "{err}");

    let err = check_structure("x = [1, 2)\n").unwrap_err();
    assert!(err.contains("does not match"), "{err}");

    let err = check_structure("x = 1)\n").unwrap_err();
    assert!(err.contains("unmatched ')'"), "{err}");
}

#[test]
fn test_structure_rejects_unterminated_strings() {
    let err = check_structure("print('hello)\nprint(1)\n").unwrap_err();
    assert!(err.contains("unterminated string literal (line 1)"), "{err}");

    let err = check_structure("x = 1\ns = '''never closed\n").unwrap_err();
    assert!(err.contains("triple-quoted"), "{err}");
    assert!(err.contains("line 2"), "{err}");
}

#[test]
fn test_python_parse_accepts_valid_code() {
    let code = "def f(x):\n    return [x, {'a': (1, 2)}]\n\nprint(f(\"it's\"))  # done)\n";
    assert!(check_syntax(code).is_ok());
    assert!(check_syntax("for i in range(3):\n    print(f\"{i}\")\n").is_ok());
}

#[test]
fn test_python_parse_rejects_invalid_code() {
    // All of these have balanced brackets and terminated strings.
    for code in [
        "x = = 1",
        "print('a' 'b' +)",
        "if True\n    print(1)\n",
        "def f(x)\n    return x\n",
    ] {
        assert!(check_structure(code).is_ok(), "{code}");
        assert!(check_syntax(code).is_err(), "{code}");
    }
}

#[test]
fn test_truncate_output() {
    assert_eq!(truncate_output("short", 10), "short");
    let long = "a".repeat(15);
    assert_eq!(
        truncate_output(&long, 10),
        format!("{}{TRUNCATION_MARKER}", "a".repeat(10))
    );
    // multi-byte characters are counted, not bytes
    assert_eq!(truncate_output("ééé", 2), format!("éé{TRUNCATION_MARKER}"));
}

#[tokio::test]
async fn test_empty_code_rejected() {
    let outcome = shell_sandbox().execute("   \n").await;
    assert!(!outcome.success);
    assert_eq!(outcome.failure, Some(ToolFailureKind::InvalidInput));
    assert_eq!(outcome.error.as_deref(), Some("No code provided"));
}

#[tokio::test]
async fn test_denied_before_syntax_check() {
    // Broken syntax and a denied import: denial wins.
    let outcome = shell_sandbox().execute("import subprocess\nprint((").await;
    assert_eq!(outcome.failure, Some(ToolFailureKind::Denied));
    assert!(outcome.error_message().contains("import subprocess"));
    assert_eq!(outcome.exit_code, None);
}

#[tokio::test]
async fn test_syntax_failure_does_not_execute() {
    let outcome = shell_sandbox().execute("echo (unclosed").await;
    assert_eq!(outcome.failure, Some(ToolFailureKind::Syntax));
    assert_eq!(outcome.exit_code, None);
}

#[tokio::test]
async fn test_python_syntax_error_is_not_a_runtime_failure() {
    // The interpreter does not exist: reaching it would be a Runtime failure.
    let sandbox = CodeSandbox::new(
        SandboxConfig::default().with_interpreter("definitely-not-an-interpreter-xyz"),
    );
    for code in ["x = = 1", "if True\n    print(1)\n"] {
        let outcome = sandbox.execute(code).await;
        assert_eq!(outcome.failure, Some(ToolFailureKind::Syntax), "{code}");
        assert!(outcome.error_message().starts_with("Syntax error:"));
        assert_eq!(outcome.exit_code, None);
    }
}

#[tokio::test]
async fn test_successful_run_captures_stdout() {
    let outcome = shell_sandbox().execute("echo hello").await;
    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.output.as_deref(), Some("hello\n"));
    assert_eq!(outcome.exit_code, Some(0));
}

#[tokio::test]
async fn test_nonzero_exit_reports_stderr() {
    let outcome = shell_sandbox().execute("echo broken 1>&2\nfalse").await;
    assert!(!outcome.success);
    assert_eq!(outcome.failure, Some(ToolFailureKind::Runtime));
    assert_eq!(outcome.error.as_deref(), Some("broken"));
    assert_eq!(outcome.exit_code, Some(1));
}

#[tokio::test]
async fn test_output_is_capped_not_failed() {
    let sandbox = CodeSandbox::new(
        SandboxConfig::default()
            .with_interpreter("sh")
            .with_script_suffix(".sh")
            .with_syntax_check(SyntaxCheck::Structural)
            .with_max_output_chars(100),
    );
    let outcome = sandbox.execute("yes a | head -n 5000").await;
    assert!(outcome.success);
    let output = outcome.output.unwrap();
    assert!(output.ends_with(TRUNCATION_MARKER));
    assert_eq!(output.chars().count(), 100 + TRUNCATION_MARKER.chars().count());
}

#[tokio::test]
async fn test_flood_of_output_is_capped() {
    let sandbox = CodeSandbox::new(
        SandboxConfig::default()
            .with_interpreter("sh")
            .with_script_suffix(".sh")
            .with_syntax_check(SyntaxCheck::Structural)
            .with_max_output_chars(64),
    );
    // About 10 MB on stdout and stderr
    let outcome = sandbox
        .execute("yes aaaa | head -n 2000000\nyes bbbb | head -n 2000000 1>&2\nexit 3")
        .await;
    assert_eq!(outcome.failure, Some(ToolFailureKind::Runtime));
    assert_eq!(outcome.exit_code, Some(3));

    let output = outcome.output.as_deref().unwrap();
    assert!(output.ends_with(TRUNCATION_MARKER));
    assert_eq!(output.chars().count(), 64 + TRUNCATION_MARKER.chars().count());

    let error = outcome.error_message();
    assert!(error.starts_with("bbbb\n"));
    assert!(error.ends_with(TRUNCATION_MARKER));
    assert_eq!(error.chars().count(), 64 + TRUNCATION_MARKER.chars().count());
}

#[test]
fn test_cap_output_marks_early_cut() {
    assert_eq!(cap_output("abc", 10, false), "abc");
    assert_eq!(cap_output("abc", 10, true), format!("abc{TRUNCATION_MARKER}"));
    assert_eq!(cap_output("abcdef", 3, true), format!("abc{TRUNCATION_MARKER}"));
}

#[tokio::test]
async fn test_timeout_kills_process() {
    let sandbox = CodeSandbox::new(
        SandboxConfig::default()
            .with_interpreter("sh")
            .with_script_suffix(".sh")
            .with_syntax_check(SyntaxCheck::Structural)
            .with_timeout(Duration::from_millis(300)),
    );
    let started = Instant::now();
    let outcome = sandbox.execute("sleep 5").await;
    assert_eq!(outcome.failure, Some(ToolFailureKind::Timeout));
    assert!(outcome.error_message().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_missing_interpreter_is_runtime_failure() {
    let sandbox = CodeSandbox::new(
        SandboxConfig::default().with_interpreter("definitely-not-an-interpreter-xyz"),
    );
    let outcome = sandbox.execute("print(1)").await;
    assert_eq!(outcome.failure, Some(ToolFailureKind::Runtime));
    assert!(outcome.error_message().contains("failed to start"));
}

#[tokio::test]
async fn test_python_round_trip() {
    if !python_available().await {
        return;
    }
    let sandbox = CodeSandbox::default();
    let outcome = sandbox
        .execute("def fib(n):\n    return n if n < 2 else fib(n - 1) + fib(n - 2)\nprint(fib(10))\n")
        .await;
    assert!(outcome.success, "{outcome:?}");
    assert_eq!(outcome.output.as_deref(), Some("55\n"));

    let failing = sandbox.execute("raise ValueError('bad value')\n").await;
    assert!(!failing.success);
    assert!(failing.error_message().contains("ValueError: bad value"));
}
