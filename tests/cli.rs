use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CAPITAL_ONE_CSV: &str = "\
Account Number,Transaction Date,Transaction Amount,Transaction Type,Transaction Description,Balance
5279,12/31/22,42.50,Debit,COFFEE SHOP,1000.00
5279,12/31/22,360.47,Credit,Monthly Interest Paid,1360.47
";

/// Every test gets its own config + data sandbox so nothing touches the real
/// home directory.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("moneypit").unwrap();
        cmd.env("MONEYPIT_CONFIG_DIR", self.dir.path().join("config"));
        cmd
    }

    fn init(&self) {
        self.cmd()
            .args(["init", "--data-dir"])
            .arg(self.dir.path().join("data"))
            .assert()
            .success();
    }

    fn write_statement(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_init_creates_data_dir() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["init", "--data-dir"])
        .arg(sandbox.dir.path().join("data"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Ready."));
    assert!(sandbox.dir.path().join("data").join("moneypit.db").exists());
}

#[test]
fn test_ingest_and_export() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement("capital_one_dec.csv", CAPITAL_ONE_CSV);

    sandbox
        .cmd()
        .arg("ingest")
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 new"));

    // Debits land negative, credits positive; uncategorized rows export with
    // an empty category column.
    sandbox
        .cmd()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("date,amount,memo,category,source_bank"))
        .stdout(predicate::str::contains("2022-12-31,-42.50,COFFEE SHOP,,CapitalOne"))
        .stdout(predicate::str::contains("360.47,Monthly Interest Paid"));
}

#[test]
fn test_ingest_same_file_twice_is_skipped() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement("capital_one_dec.csv", CAPITAL_ONE_CSV);

    sandbox.cmd().arg("ingest").arg(&statement).assert().success();
    sandbox
        .cmd()
        .arg("ingest")
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("already processed"));
}

#[test]
fn test_ingest_unrecognized_filename_fails() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement("mystery.csv", "a,b,c\n");

    sandbox
        .cmd()
        .arg("ingest")
        .arg(&statement)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No idea how to parse it"));
}

#[test]
fn test_ingest_directory_isolates_failures() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statements = sandbox.dir.path().join("statements");
    std::fs::create_dir(&statements).unwrap();
    std::fs::write(statements.join("capital_one.csv"), CAPITAL_ONE_CSV).unwrap();
    std::fs::write(statements.join("mystery.csv"), "a,b,c\n").unwrap();

    sandbox
        .cmd()
        .arg("ingest")
        .arg(&statements)
        .assert()
        .success()
        .stdout(predicate::str::contains("capital_one.csv"))
        .stdout(predicate::str::contains("Failed"))
        .stdout(predicate::str::contains("1 file(s) failed"));
}

#[test]
fn test_files_list_shows_ingested_statement() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement("barclays_jan.csv", "01/15/2023,LOCAL STORE,Misc,-12.34\n");
    sandbox.cmd().arg("ingest").arg(&statement).assert().success();

    sandbox
        .cmd()
        .args(["files", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("barclays_jan.csv"))
        .stdout(predicate::str::contains("Barclays"));
}

#[test]
fn test_files_remove_cascades() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement("capital_one_dec.csv", CAPITAL_ONE_CSV);
    sandbox.cmd().arg("ingest").arg(&statement).assert().success();

    sandbox
        .cmd()
        .args(["files", "remove", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 transaction(s)"));

    sandbox
        .cmd()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("COFFEE SHOP").not());
}

#[test]
fn test_tx_memo_overrides_display_text() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement("capital_one_dec.csv", CAPITAL_ONE_CSV);
    sandbox.cmd().arg("ingest").arg(&statement).assert().success();

    sandbox
        .cmd()
        .args(["tx", "memo", "1", "Morning coffee"])
        .assert()
        .success();

    sandbox
        .cmd()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Morning coffee"))
        .stdout(predicate::str::contains("COFFEE SHOP").not());
}

#[test]
fn test_tx_delete_hides_transaction() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement("capital_one_dec.csv", CAPITAL_ONE_CSV);
    sandbox.cmd().arg("ingest").arg(&statement).assert().success();

    sandbox.cmd().args(["tx", "delete", "1"]).assert().success();

    sandbox
        .cmd()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("COFFEE SHOP").not())
        .stdout(predicate::str::contains("Monthly Interest Paid"));

    sandbox
        .cmd()
        .args(["tx", "delete", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such transaction"));
}

#[test]
fn test_tx_set_category_and_heatmap() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement(
        "chase_jan.csv",
        "01/05/2023,01/06/2023,BLUE BOTTLE COFFEE,Food,Sale,-6.50,\n",
    );
    sandbox.cmd().arg("ingest").arg(&statement).assert().success();

    sandbox
        .cmd()
        .args(["tx", "set-category", "1", "Coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'coffee'"));

    sandbox
        .cmd()
        .args(["report", "heatmap", "--from", "2023-01-01", "--to", "2023-12-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coffee"))
        .stdout(predicate::str::contains("-$6.50"));
}

#[test]
fn test_report_transactions_filters_by_category() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let statement = sandbox.write_statement(
        "chase_jan.csv",
        "01/05/2023,01/06/2023,BLUE BOTTLE COFFEE,Food,Sale,-6.50,\n\
         01/10/2023,01/11/2023,LOCAL MARKET,Groceries,Sale,-40.00,\n",
    );
    sandbox.cmd().arg("ingest").arg(&statement).assert().success();
    sandbox
        .cmd()
        .args(["tx", "set-category", "1", "coffee"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args([
            "report",
            "transactions",
            "--from",
            "2023-01-01",
            "--to",
            "2023-12-31",
            "--category",
            "coffee",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("BLUE BOTTLE COFFEE"))
        .stdout(predicate::str::contains("LOCAL MARKET").not());
}

#[test]
fn test_categories_and_rules_lists_start_empty() {
    let sandbox = Sandbox::new();
    sandbox.init();

    sandbox
        .cmd()
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No categories yet"));

    sandbox
        .cmd()
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rules yet"));
}
