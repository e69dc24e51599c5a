use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;
use tempfile::TempDir;

/// Write a one-page PDF with each line drawn in Helvetica, top to bottom.
fn write_statement(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Td", vec![50.into(), 780.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn passbook(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("passbook").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    passbook(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_parse_missing_input_fails() {
    let home = TempDir::new().unwrap();
    passbook(&home)
        .args(["parse", "/nonexistent/statement.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_parse_unreadable_document_reports_zero() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("broken.pdf");
    fs::write(&input, b"this is not a pdf").unwrap();

    passbook(&home)
        .arg("parse")
        .arg(&input)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("transactions:0"))
        .stderr(predicate::str::contains("document unreadable"));
}

#[test]
fn test_parse_writes_transactions() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("statement.pdf");
    let output = home.path().join("out.json");
    write_statement(
        &input,
        &["Savings account statement", "01/04/2024 UPI-COFFEE 100.00 900.00"],
    );

    passbook(&home)
        .arg("parse")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--report")
        .assert()
        .success()
        .stdout(predicate::str::contains("transactions:1"))
        .stderr(predicate::str::contains("STANDARD"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json[0]["Date"], "01/04/2024");
    assert_eq!(json[0]["Amount"], "100.00");
    assert_eq!(json[0]["Balance"], "900.00");
    assert_eq!(json[0]["Bank"], "STANDARD");
}

#[test]
fn test_parse_empty_statement_exits_one() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("empty.pdf");
    let output = home.path().join("empty.json");
    write_statement(&input, &["Savings account statement", "No transactions this period"]);

    passbook(&home)
        .arg("parse")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("transactions:0"));
    assert!(!output.exists());
}

#[test]
fn test_detect_prints_format() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("axis.pdf");
    write_statement(&input, &["AXIS BANK", "Statement of Account"]);

    passbook(&home)
        .arg("detect")
        .arg(&input)
        .arg("--chain")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("AXIS"))
        .stdout(predicate::str::contains("pattern:standard"));
}

#[test]
fn test_batch_continue_on_error_with_summary() {
    let home = TempDir::new().unwrap();
    let input_dir = home.path().join("in");
    let output_dir = home.path().join("out");
    fs::create_dir_all(&input_dir).unwrap();
    write_statement(&input_dir.join("good.pdf"), &["01/04/2024 SALARY 5000.00 6000.00"]);
    fs::write(input_dir.join("bad.pdf"), b"garbage").unwrap();

    passbook(&home)
        .arg("batch")
        .arg(format!("{}/*.pdf", input_dir.display()))
        .arg("-o")
        .arg(&output_dir)
        .args(["-j", "2", "--continue-on-error", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 files"));

    assert!(output_dir.join("good.json").exists());
    assert!(!output_dir.join("bad.json").exists());
    let summary = fs::read_to_string(output_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("good.pdf,success,STANDARD"));
    assert!(summary.contains("bad.pdf,error"));
}

#[test]
fn test_batch_stops_on_error_by_default() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("bad.pdf"), b"garbage").unwrap();

    passbook(&home)
        .arg("batch")
        .arg(format!("{}/*.pdf", home.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_config_init_and_get() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("passbook.json");

    passbook(&home)
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .success();
    assert!(config_path.exists());

    passbook(&home)
        .args(["config", "init", "-o"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    passbook(&home)
        .args(["config", "get", "extraction.min_transactions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));

    passbook(&home)
        .args(["config", "get", "split_rules.KOTAK.column"])
        .assert()
        .success();

    passbook(&home)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure();
}
