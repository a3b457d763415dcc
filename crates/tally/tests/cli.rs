//! Runs parsed command lines against export files in a temp directory.

use std::fs;
use std::path::Path;

use clap::Parser;
use serde_json::{json, Value};
use tally::cli::Cli;
use tally::config::Config;

fn write_exports(dir: &Path) {
    let invoices = json!({
        "items": [
            { "invoiceNumber": "INV-001", "customerName": "Acme", "status": "paid", "issueDate": "2024-01-10", "total": 1200 },
            { "invoice_number": "INV-002", "customer_name": "Globex", "status": "overdue", "issue_date": "2024-01-20", "total": 80 },
            { "invoice_number": "INV-003", "customer_name": "Initech", "status": "paid", "issue_date": "2024-02-05", "total": 430 },
            { "invoiceNumber": "INV-004", "customerName": "Acme Labs", "status": "draft" },
        ]
    });
    fs::write(dir.join("invoice.json"), invoices.to_string()).unwrap();
}

fn run(config: &Config, argv: &[&str]) -> (String, String) {
    let cli = Cli::try_parse_from(std::iter::once("tally").chain(argv.iter().copied())).unwrap();
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    tally::run(cli.command, config, false, &mut out, &mut err).unwrap();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

fn config_for(dir: &Path) -> Config {
    Config {
        data_dir: Some(dir.to_path_buf()),
        ..Config::default()
    }
}

#[test]
fn lists_paid_invoices_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    write_exports(dir.path());

    let (out, err) = run(
        &config_for(dir.path()),
        &["list", "invoice", "--status", "paid", "--output", "json"],
    );
    assert!(err.is_empty());

    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total_matched"], 2);
    assert_eq!(parsed["page_count"], 1);
    assert_eq!(parsed["items"][0]["invoice_number"], "INV-003");
    assert_eq!(parsed["items"][1]["invoiceNumber"], "INV-001");
}

#[test]
fn text_output_pages_with_one_based_page_numbers() {
    let dir = tempfile::tempdir().unwrap();
    write_exports(dir.path());

    let (out, _) = run(
        &config_for(dir.path()),
        &["list", "invoices", "--sort", "invoiceNumber", "--page-size", "3", "--page", "2"],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("invoiceNumber"));
    assert!(lines[1].starts_with("INV-004"));
    assert_eq!(lines[2], "page 2 of 2 (4 matched)");
}

#[test]
fn search_and_date_range() {
    let dir = tempfile::tempdir().unwrap();
    write_exports(dir.path());

    let (out, _) = run(
        &config_for(dir.path()),
        &[
            "list",
            "invoice",
            "--search",
            "ACME",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
            "--output",
            "csv",
        ],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "INV-001,Acme,paid,2024-01-10,1200");
}

#[test]
fn explicit_file_overrides_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks-export.json");
    fs::write(
        &path,
        json!([
            { "title": "Write report", "status": "Done", "due_date": "2024-03-01" },
            { "title": "Call client", "status": "Todo", "dueDate": "2024-02-01" },
        ])
        .to_string(),
    )
    .unwrap();

    let (out, _) = run(
        &Config::default(),
        &["list", "task", "--file", path.to_str().unwrap(), "--status", "todo"],
    );
    assert!(out.contains("Call client"));
    assert!(!out.contains("Write report"));
}

#[test]
fn missing_export_is_a_notification_not_an_error() {
    let dir = tempfile::tempdir().unwrap();

    let (out, err) = run(&config_for(dir.path()), &["list", "customer"]);
    assert!(out.starts_with("No customers found.\n"));
    assert!(out.contains("error: Failed to load customers"));
    assert!(err.is_empty());

    let (out, err) = run(&config_for(dir.path()), &["list", "customer", "-o", "yaml"]);
    assert!(out.contains("total_matched: 0"));
    assert!(err.starts_with("error: Failed to load customers"));
}

#[test]
fn invalid_status_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_exports(dir.path());

    let cli = Cli::try_parse_from(["tally", "list", "invoice", "--status", "void"]).unwrap();
    let result = tally::run(
        cli.command,
        &config_for(dir.path()),
        false,
        &mut Vec::<u8>::new(),
        &mut Vec::<u8>::new(),
    );
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("cannot filter invoices by status"));
    assert!(message.contains("invalid status 'void'"));
}

#[test]
fn entities_lists_the_catalog() {
    let (out, _) = run(&Config::default(), &["entities"]);
    for name in ["invoice", "project", "task", "employee", "customer"] {
        assert!(out.contains(name));
    }
    assert!(out.contains("/team/employees"));
}

#[test]
fn lists_one_projects_invoices_for_one_customer() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("invoice.json"),
        json!([
            { "invoice_number": "INV-1", "project_id": "p-1", "customer_id": "c-1", "issue_date": "2024-01-01" },
            { "invoice_number": "INV-2", "projectId": "p-1", "customerId": "c-2", "issueDate": "2024-01-02" },
            { "invoice_number": "INV-3", "project_id": "p-2", "customer_id": "c-1", "issue_date": "2024-01-03" },
        ])
        .to_string(),
    )
    .unwrap();

    let (out, _) = run(
        &config_for(dir.path()),
        &["list", "invoice", "--project", "p-1", "-o", "json"],
    );
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total_matched"], 2);
    assert_eq!(parsed["items"][0]["invoice_number"], "INV-2");

    let (out, _) = run(
        &config_for(dir.path()),
        &["list", "invoice", "--project", "p-1", "--customer", "c-1", "-o", "json"],
    );
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total_matched"], 1);
    assert_eq!(parsed["items"][0]["invoice_number"], "INV-1");
}

#[test]
fn overdue_tasks_skip_done_and_future() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("task.json"),
        json!([
            { "title": "Late", "status": "Todo", "due_date": "2000-01-01" },
            { "title": "Finished", "status": "Done", "due_date": "2000-01-01" },
            { "title": "Later", "status": "Todo", "dueDate": "2999-01-01" },
            { "title": "Undated", "status": "Blocked" },
        ])
        .to_string(),
    )
    .unwrap();

    let (out, _) = run(&config_for(dir.path()), &["list", "tasks", "--overdue", "-o", "json"]);
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total_matched"], 1);
    assert_eq!(parsed["items"][0]["title"], "Late");
}

#[test]
fn scoping_an_entity_that_has_no_such_field_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    for (argv, expected) in [
        (vec!["tally", "list", "employee", "--project", "p-1"], "employees cannot be listed per project"),
        (vec!["tally", "list", "task", "--customer", "c-1"], "tasks cannot be listed per customer"),
        (vec!["tally", "list", "invoice", "--overdue"], "only tasks have an overdue view"),
    ] {
        let cli = Cli::try_parse_from(argv).unwrap();
        let result = tally::run(
            cli.command,
            &config_for(dir.path()),
            false,
            &mut Vec::<u8>::new(),
            &mut Vec::<u8>::new(),
        );
        assert_eq!(result.unwrap_err().to_string(), expected);
    }
}

#[test]
fn customers_default_to_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("customer.json"),
        json!([
            { "name": "Acme", "created_at": "2023-05-01T10:00:00" },
            { "name": "Globex", "createdAt": "2024-02-01T08:00:00" },
        ])
        .to_string(),
    )
    .unwrap();

    let (out, _) = run(&config_for(dir.path()), &["list", "customer", "-o", "csv"]);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[1].starts_with("Globex,"));
    assert!(lines[2].starts_with("Acme,"));
}

#[test]
fn config_file_and_env_layers() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("global.yaml");
    fs::write(&global, "data_dir: /srv/exports\npage_size: 50\n").unwrap();
    let path = dir.path().join("custom.yaml");
    fs::write(&path, "page_size: 2\noutput: csv\nlog_level: info\n").unwrap();

    let config = Config::load_with(Some(global.as_path()), Some(path.as_path()), |name| {
        (name == "TALLY_OUTPUT").then(|| "json".to_string())
    })
    .unwrap();

    assert_eq!(config.data_dir(), std::path::PathBuf::from("/srv/exports"));
    assert_eq!(config.page_size(), 2);
    assert_eq!(config.output(), tally::output::OutputFormat::Json);
    assert_eq!(config.log_level(), "info");
}

#[test]
fn missing_global_config_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_with(Some(dir.path().join("absent.yaml").as_path()), None, |_| None);
    assert!(config.is_ok());
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load_with(None, Some(dir.path().join("nope.yaml").as_path()), |_| None);
    assert!(matches!(result, Err(tally::config::ConfigError::Read { .. })));
}
