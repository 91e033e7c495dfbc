use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

const EXPECTED_ROOT_HELP: &str = "Centsible - personal budgeting and spending insights

Usage:
  centsible <command>

Start here:
  centsible category add Groceries
  centsible txn import --help
  centsible progress
";

static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

fn unique_test_home() -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    let stamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(value) => value.as_nanos(),
        Err(_) => 0,
    };
    let sequence = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!(
        "centsible-cli-test-{}-{stamp}-{sequence}",
        std::process::id()
    ));
    path
}

fn run_cli_in_home_with_input(
    home: &std::path::Path,
    args: &[&str],
    input: Option<&str>,
) -> (bool, String) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_centsible"));
    for arg in args {
        command.arg(arg);
    }
    command.env("CENTSIBLE_HOME", home);
    if input.is_some() {
        command.stdin(Stdio::piped());
    }
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let child_spawn = command.spawn();
    assert!(child_spawn.is_ok());
    if let Ok(mut child) = child_spawn {
        if let Some(body) = input {
            let mut stdin = child.stdin.take();
            assert!(stdin.is_some());
            if let Some(mut pipe) = stdin.take() {
                let write_result = pipe.write_all(body.as_bytes());
                assert!(write_result.is_ok());
            }
        }

        let output = child.wait_with_output();
        assert!(output.is_ok());
        if let Ok(result) = output {
            let stdout = String::from_utf8(result.stdout);
            assert!(stdout.is_ok());
            if let Ok(stdout_text) = stdout {
                return (result.status.success(), stdout_text);
            }
        }
    }

    (false, String::new())
}

fn run_cli_with_input(args: &[&str], input: Option<&str>) -> (bool, String, std::path::PathBuf) {
    let home = unique_test_home();
    let (ok, body) = run_cli_in_home_with_input(&home, args, input);
    (ok, body, home)
}

fn run_cli(args: &[&str]) -> (bool, String, std::path::PathBuf) {
    run_cli_with_input(args, None)
}

fn write_source_file(home: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let create_home = fs::create_dir_all(home);
    assert!(create_home.is_ok());

    let source_path = home.join(name);
    let write = fs::write(&source_path, body);
    assert!(write.is_ok());
    source_path
}

fn parse_json(body: &str) -> Value {
    let parsed = serde_json::from_str::<Value>(body);
    assert!(parsed.is_ok());
    if let Ok(value) = parsed {
        return value;
    }
    Value::Null
}

fn assert_pipe_close_does_not_panic(args: &[&str], expect_success: bool) {
    let home = unique_test_home();
    let mut producer = Command::new(env!("CARGO_BIN_EXE_centsible"));
    producer.args(args);
    producer.env("CENTSIBLE_HOME", &home);
    producer.stdout(Stdio::piped());
    producer.stderr(Stdio::piped());

    let producer_spawn = producer.spawn();
    assert!(producer_spawn.is_ok());
    if let Ok(mut producer_child) = producer_spawn {
        let producer_stdout = producer_child.stdout.take();
        let producer_stderr = producer_child.stderr.take();
        assert!(producer_stdout.is_some());
        assert!(producer_stderr.is_some());

        if let Some(stdout_pipe) = producer_stdout {
            let mut reader = BufReader::new(stdout_pipe);
            let mut first_line = String::new();
            let read_result = reader.read_line(&mut first_line);
            assert!(read_result.is_ok());
            assert!(!first_line.is_empty());
            drop(reader);
        }

        let status = producer_child.wait();
        assert!(status.is_ok());
        if let Ok(exit_status) = status {
            assert_eq!(exit_status.success(), expect_success);
        }

        if let Some(mut stderr_pipe) = producer_stderr {
            let mut stderr_bytes = Vec::new();
            let stderr_read = stderr_pipe.read_to_end(&mut stderr_bytes);
            assert!(stderr_read.is_ok());
            let stderr = String::from_utf8(stderr_bytes);
            assert!(stderr.is_ok());
            if let Ok(stderr_text) = stderr {
                assert!(!stderr_text.contains("Broken pipe"));
                assert!(!stderr_text.contains("failed printing to stdout"));
            }
        }
    }
}

fn assert_text_error_contract(body: &str, code: &str) {
    assert!(body.contains("Something went wrong, but it's easy to fix."));
    assert!(body.contains(&format!("  Error:    {code}")));
    assert!(body.contains("  Details:"));
    assert!(body.contains("What to do next:"));
}

fn assert_json_error_contract(body: &str, code: &str) -> Value {
    let payload = parse_json(body);
    assert_eq!(payload["error"]["code"], Value::String(code.to_string()));
    assert!(payload["error"]["message"].is_string());
    assert!(payload["error"]["recovery_steps"].is_array());
    payload
}

#[test]
fn root_command_uses_short_plaintext_help() {
    let (ok, body, _) = run_cli(&[]);
    assert!(ok);
    assert_eq!(body, EXPECTED_ROOT_HELP);
}

#[test]
fn help_and_version_return_success_output() {
    let (help_ok, help_body, _) = run_cli(&["--help"]);
    assert!(help_ok);
    assert!(help_body.starts_with("Centsible — personal budgeting and spending insights"));
    assert!(help_body.contains("centsible txn import --dry-run <path>"));
    assert!(help_body.contains("centsible insights"));

    let (version_ok, version_body, _) = run_cli(&["--version"]);
    assert!(version_ok);
    assert_eq!(version_body.trim(), "centsible 0.1.0");
}

#[test]
fn help_output_pipe_close_does_not_panic() {
    assert_pipe_close_does_not_panic(&["txn", "import", "--help"], true);
}

#[test]
fn success_output_pipe_close_does_not_panic() {
    assert_pipe_close_does_not_panic(&["category", "list"], true);
}

#[test]
fn error_output_pipe_close_does_not_panic() {
    assert_pipe_close_does_not_panic(&["txn", "import", "--nope"], false);
}

#[test]
fn txn_help_shows_subcommand_descriptions() {
    let (ok, body, _) = run_cli(&["txn", "--help"]);
    assert!(ok);
    assert!(body.contains("add"));
    assert!(body.contains("list"));
    assert!(body.contains("import"));
    assert!(body.contains("Record a single transaction"));
    assert!(body.contains("Import normalized transaction data"));
}

#[test]
fn txn_import_help_shows_workflow_and_schema() {
    let (ok, body, _) = run_cli(&["txn", "import", "--help"]);
    assert!(ok);
    assert!(body.contains("How import works:"));
    assert!(body.contains("What to do next:"));
    assert!(body.contains("Import schema:"));
    assert!(body.contains("posted_at"));
    assert!(body.contains("YYYY-MM-DD"));
    assert!(body.contains("negative = money out"));
    assert!(body.contains("positive = money in"));
    assert!(body.contains("category (optional):"));
}

#[test]
fn bare_txn_shows_help_with_subcommands() {
    let (ok, body, _) = run_cli(&["txn"]);
    assert!(ok);
    assert!(body.contains("add"));
    assert!(body.contains("list"));
    assert!(body.contains("import"));
}

#[test]
fn category_add_and_list_contracts_are_supported() {
    let home = unique_test_home();

    let (add_ok, add_body) =
        run_cli_in_home_with_input(&home, &["category", "add", "Groceries"], None);
    assert!(add_ok);
    assert!(add_body.contains("Category `Groceries` created."));
    assert!(add_body.contains("Category ID:"));

    let (list_ok, list_body) = run_cli_in_home_with_input(&home, &["category", "list"], None);
    assert!(list_ok);
    assert!(list_body.contains("1 category found."));
    assert!(list_body.contains("Groceries"));

    let (json_ok, json_body) =
        run_cli_in_home_with_input(&home, &["category", "list", "--json"], None);
    assert!(json_ok);
    let payload = parse_json(&json_body);
    assert!(payload.is_array());
    assert_eq!(payload[0]["name"], Value::String("Groceries".to_string()));
}

#[test]
fn duplicate_category_uses_error_contract_and_exit_code() {
    let home = unique_test_home();

    let (first_ok, _) = run_cli_in_home_with_input(&home, &["category", "add", "Dining"], None);
    assert!(first_ok);

    let (second_ok, body) = run_cli_in_home_with_input(&home, &["category", "add", "dining"], None);
    assert!(!second_ok);
    assert_text_error_contract(&body, "duplicate_category");

    let (json_ok, json_body) =
        run_cli_in_home_with_input(&home, &["category", "add", "DINING", "--json"], None);
    assert!(!json_ok);
    assert_json_error_contract(&json_body, "duplicate_category");
}

#[test]
fn txn_add_list_and_budget_progress_flow() {
    let home = unique_test_home();

    let (cat_ok, _) = run_cli_in_home_with_input(&home, &["category", "add", "Groceries"], None);
    assert!(cat_ok);

    let (txn_ok, txn_body) = run_cli_in_home_with_input(
        &home,
        &[
            "txn",
            "add",
            "--date",
            "2026-03-05",
            "--amount",
            "-80.00",
            "--description",
            "Weekly shop",
            "--category",
            "Groceries",
        ],
        None,
    );
    assert!(txn_ok);
    assert!(txn_body.contains("Txn ID:"));
    assert!(txn_body.contains("-$80.00"));

    let (budget_ok, budget_body) = run_cli_in_home_with_input(
        &home,
        &[
            "budget", "set", "--category", "Groceries", "--amount", "100",
        ],
        None,
    );
    assert!(budget_ok);
    assert!(budget_body.contains("Budget of 100.00 per monthly set for `Groceries`."));

    let (progress_ok, progress_body) = run_cli_in_home_with_input(
        &home,
        &["progress", "--as-of", "2026-03-15"],
        None,
    );
    assert!(progress_ok);
    assert!(progress_body.contains("Budget progress as of 2026-03-15."));
    assert!(progress_body.contains("Groceries (monthly, 2026-03-01 to 2026-03-31)"));
    assert!(progress_body.contains("80% (warning)"));

    let (json_ok, json_body) = run_cli_in_home_with_input(
        &home,
        &["progress", "--as-of", "2026-03-15", "--json"],
        None,
    );
    assert!(json_ok);
    let payload = parse_json(&json_body);
    assert_eq!(payload["ok"], Value::Bool(true));
    assert_eq!(
        payload["data"]["rows"][0]["status"],
        Value::String("warning".to_string())
    );
}

#[test]
fn txn_import_dry_run_and_commit_from_stdin() {
    let home = unique_test_home();
    let body = r#"[
  {"posted_at": "2026-03-01", "amount": -42.15, "description": "WHOLE FOODS", "category": "Groceries"},
  {"posted_at": "2026-03-02", "amount": -12.00, "description": "LUNCH", "category": "Dining"}
]"#;

    let (dry_ok, dry_body) =
        run_cli_in_home_with_input(&home, &["txn", "import", "--dry-run", "-"], Some(body));
    assert!(dry_ok);
    assert!(dry_body.contains("Dry-run validation completed successfully."));
    assert!(dry_body.contains("No rows were written because this was a dry run."));

    let (commit_ok, commit_body) =
        run_cli_in_home_with_input(&home, &["txn", "import", "-"], Some(body));
    assert!(commit_ok);
    assert!(commit_body.contains("Import completed successfully."));
    assert!(commit_body.contains("Inserted:"));
    assert!(commit_body.contains("Categories created:"));

    let (list_ok, list_body) = run_cli_in_home_with_input(&home, &["txn", "list"], None);
    assert!(list_ok);
    assert!(list_body.contains("2 transactions found."));
    assert!(list_body.contains("WHOLE FOODS"));
}

#[test]
fn txn_import_from_file_reports_validation_issues() {
    let home = unique_test_home();
    let source_path = write_source_file(
        &home,
        "rows.csv",
        "posted_at,amount,description\n2026-03-99,-5.00,Lunch\n",
    );
    let source_arg = source_path.display().to_string();

    let (ok, body) = run_cli_in_home_with_input(&home, &["txn", "import", &source_arg], None);
    assert!(!ok);
    assert_text_error_contract(&body, "import_validation_failed");

    let (json_ok, json_body) =
        run_cli_in_home_with_input(&home, &["txn", "import", &source_arg, "--json"], None);
    assert!(!json_ok);
    assert_json_error_contract(&json_body, "import_validation_failed");
}

#[test]
fn budget_remove_without_budget_uses_error_contract() {
    let home = unique_test_home();

    let (cat_ok, _) = run_cli_in_home_with_input(&home, &["category", "add", "Travel"], None);
    assert!(cat_ok);

    let (ok, body) = run_cli_in_home_with_input(&home, &["budget", "remove", "Travel"], None);
    assert!(!ok);
    assert_text_error_contract(&body, "budget_not_found");
}

#[test]
fn insights_text_and_json_contracts_are_supported() {
    let home = unique_test_home();
    let body = r#"[
  {"posted_at": "2026-03-05", "amount": -350.00, "description": "DINNERS", "category": "Dining"},
  {"posted_at": "2026-03-08", "amount": -650.00, "description": "RENT", "category": "Rent"}
]"#;

    let (import_ok, _) = run_cli_in_home_with_input(&home, &["txn", "import", "-"], Some(body));
    assert!(import_ok);

    let (text_ok, text_body) = run_cli_in_home_with_input(
        &home,
        &["insights", "--as-of", "2026-03-31"],
        None,
    );
    assert!(text_ok);
    assert!(text_body.contains("Spending insights as of 2026-03-31."));
    assert!(text_body.contains("Total spent:"));
    assert!(text_body.contains("Top categories:"));
    assert!(text_body.contains("Rent"));

    let (json_ok, json_body) = run_cli_in_home_with_input(
        &home,
        &["insights", "--as-of", "2026-03-31", "--json"],
        None,
    );
    assert!(json_ok);
    let payload = parse_json(&json_body);
    assert_eq!(payload["ok"], Value::Bool(true));
    assert_eq!(
        payload["data"]["policy_version"],
        Value::String("insights/v1".to_string())
    );
    assert_eq!(payload["data"]["total_spent"], Value::from(1000.0));
    // No prior-window spend means the comparison serializes to null.
    assert!(payload["data"]["monthly_comparison"].is_null());
}

#[test]
fn parse_errors_use_error_contract_with_command_hint() {
    let (ok, body, _) = run_cli(&["txn", "list", "--from", "not-a-date"]);
    assert!(!ok);
    assert_text_error_contract(&body, "invalid_argument");
    assert!(body.contains("centsible txn list --help"));

    let (json_ok, json_body, _) = run_cli(&["budget", "set", "--json"]);
    assert!(!json_ok);
    assert_json_error_contract(&json_body, "invalid_argument");
}

#[test]
fn unknown_command_is_rejected_with_guidance() {
    let (ok, body, _) = run_cli(&["report"]);
    assert!(!ok);
    assert_text_error_contract(&body, "invalid_argument");
    assert!(body.contains("centsible --help"));
}
