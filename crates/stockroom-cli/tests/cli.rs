#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated to `temp`: its own config file and data directory
fn stockroom_cmd(temp: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("stockroom"));
    cmd.env("STOCKROOM_CONFIG", temp.join("config.toml"))
        .env("STOCKROOM_DATA_DIR", temp.join("data"))
        .env_remove("STOCKROOM_LOG")
        .env_remove("STOCKROOM_PAGE_SIZE")
        .env_remove("STOCKROOM_LOW_STOCK_THRESHOLD")
        .env_remove("STOCKROOM_EXPIRY_WARNING_DAYS")
        .current_dir(temp);
    cmd
}

fn add_product(temp: &Path, name: &str, quantity: &str) -> String {
    let out = stockroom_cmd(temp)
        .args([
            "--quiet",
            "product",
            "add",
            name,
            "--quantity",
            quantity,
            "--price",
            "9.99",
            "--expires",
            "2030-01-01",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).unwrap().trim().to_string()
}

#[test]
fn test_add_and_list_products() {
    let temp = TempDir::new().unwrap();
    let id = add_product(temp.path(), "Vitamin C", "5");
    assert!(!id.is_empty());

    stockroom_cmd(temp.path())
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vitamin C"))
        .stdout(predicate::str::contains(&id[..8]));

    stockroom_cmd(temp.path())
        .args(["--json", "product", "list", "--search", "VIT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_matches\": 1"));

    assert!(temp.path().join("data").join("products.json").exists());
}

#[test]
fn test_invalid_product_reports_fields() {
    let temp = TempDir::new().unwrap();

    stockroom_cmd(temp.path())
        .args(["product", "add", "Gauze", "--price", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity: Quantity must be positive."))
        .stderr(predicate::str::contains("expirationDate: Expiration date is required."));

    stockroom_cmd(temp.path())
        .args(["--quiet", "product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_show_edit_and_delete_by_prefix() {
    let temp = TempDir::new().unwrap();
    let id = add_product(temp.path(), "Aspirin", "20");
    add_product(temp.path(), "Zinc", "3");
    let prefix = &id[..8];

    stockroom_cmd(temp.path())
        .args(["product", "edit", prefix, "--quantity", "7"])
        .assert()
        .success();

    stockroom_cmd(temp.path())
        .args(["product", "show", prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aspirin"))
        .stdout(predicate::str::contains("quantity:"))
        .stdout(predicate::str::contains("7"));

    stockroom_cmd(temp.path())
        .args(["product", "delete", prefix, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 product(s)"));

    stockroom_cmd(temp.path())
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aspirin").not())
        .stdout(predicate::str::contains("Zinc"));
}

#[test]
fn test_import_sales_and_export_csv() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("sales.json");
    fs::write(
        &file,
        r#"[
            {"product": "Aspirin", "quantity": 2, "price": 4.5},
            {"productName": "Gauze", "quantity": 1, "price": 2}
        ]"#,
    )
    .unwrap();

    stockroom_cmd(temp.path())
        .args(["sale", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 sale(s)"));

    stockroom_cmd(temp.path())
        .args(["sale", "export", "--format", "csv", "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,product,quantity,price,date\n"))
        .stdout(predicate::str::contains(",Gauze,1,2,"));

    stockroom_cmd(temp.path())
        .args(["sale", "export"])
        .assert()
        .success();
    assert!(temp.path().join("sales_export.json").exists());
}

#[test]
fn test_import_rejects_non_array() {
    let temp = TempDir::new().unwrap();
    add_product(temp.path(), "Keep", "4");
    let file = temp.path().join("bad.json");
    fs::write(&file, r#"{"name": "not a list"}"#).unwrap();

    stockroom_cmd(temp.path())
        .args(["product", "import", "--replace"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid import file"));

    stockroom_cmd(temp.path())
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keep"));
}

#[test]
fn test_sale_list_date_range() {
    let temp = TempDir::new().unwrap();
    for (product, date) in [("Aspirin", "2024-03-02"), ("Gauze", "2024-04-10")] {
        stockroom_cmd(temp.path())
            .args(["sale", "add", product, "--quantity", "1", "--price", "3", "--date", date])
            .assert()
            .success();
    }

    stockroom_cmd(temp.path())
        .args(["sale", "list", "--from", "2024-03-01", "--to", "2024-03-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aspirin"))
        .stdout(predicate::str::contains("Gauze").not());
}

#[test]
fn test_report_json() {
    let temp = TempDir::new().unwrap();
    add_product(temp.path(), "Gauze", "2");

    stockroom_cmd(temp.path())
        .args(["--json", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"inventory\""))
        .stdout(predicate::str::contains("\"totalProducts\": 1"));
}

#[test]
fn test_config_set_and_show() {
    let temp = TempDir::new().unwrap();

    stockroom_cmd(temp.path())
        .args(["config", "set", "page_size", "25"])
        .assert()
        .success();
    assert!(temp.path().join("config.toml").exists());

    stockroom_cmd(temp.path())
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"page_size\":25"));

    stockroom_cmd(temp.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_data_backup_reset_restore() {
    let temp = TempDir::new().unwrap();
    add_product(temp.path(), "Aspirin", "6");

    stockroom_cmd(temp.path())
        .args(["data", "backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backed up 1 product(s) and 0 sale(s)"));
    let backup = temp.path().join("backup.json");
    assert!(backup.exists());

    stockroom_cmd(temp.path())
        .args(["data", "reset", "--yes"])
        .assert()
        .success();
    assert!(!temp.path().join("data").join("products.json").exists());

    stockroom_cmd(temp.path())
        .args(["data", "restore"])
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 product(s)"));

    stockroom_cmd(temp.path())
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aspirin"));
}

#[test]
fn test_data_restore_dashboard_backup() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("old-backup.json");
    fs::write(
        &file,
        r#"{
            "sales": [{"product": "Aspirin", "quantity": "2", "price": "4.50", "date": "2024-05-01", "id": 1712345678901.123}],
            "inventory": [{"name": "Gauze", "category": null, "quantity": 3, "price": "1.25"}]
        }"#,
    )
    .unwrap();

    stockroom_cmd(temp.path())
        .args(["--json", "data", "restore"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"imported\": 1"));

    stockroom_cmd(temp.path())
        .args(["sale", "export", "--format", "csv", "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1712345678901.123,Aspirin,2,4.5,2024-05-01"));
}
