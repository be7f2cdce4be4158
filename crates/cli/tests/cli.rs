use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CATALOG: &str = r#"{
    "products": [
        {"id": "p1", "tenant_id": "acme", "name": "Phone", "description": "",
         "category_id": "outdoor", "price": 0.0, "images": []},
        {"id": "p2", "tenant_id": "acme", "name": "Two Person Backpacking Tent",
         "description": "A light tent for two. Packs down small. Sets up in minutes. Ships with stakes.",
         "category_id": "outdoor", "price": 249.0, "images": ["a.jpg", "b.jpg", "c.jpg"]},
        {"id": "p1", "tenant_id": "globex", "name": "Other Phone"},
        {"id": "loud", "tenant_id": "fixco", "name": "BEST TENT!!! EVER MADE FOR CAMPING",
         "category_id": "outdoor", "price": 99.0, "images": ["a.jpg"]}
    ],
    "rules": [
        {"id": "r1", "name": "Title length", "category": "title", "rule_type": "length"}
    ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("catalog.json"), CATALOG).expect("write catalog");
        Self { dir }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("results.sqlite")
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("feed-doctor");
        cmd.current_dir(self.dir.path())
            .env("FEED_DOCTOR__LLM__PROVIDER", "none")
            .arg("--catalog")
            .arg(self.dir.path().join("catalog.json"))
            .arg("--db")
            .arg(self.db());
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).arg("--json").output().expect("run command");
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("valid json")
    }
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("feed-doctor.toml");

    let mut cmd = cargo_bin_cmd!("feed-doctor");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("catalog_path"));
    assert!(content.contains("provider_timeout_secs"));

    let mut again = cargo_bin_cmd!("feed-doctor");
    again
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn analyze_outputs_rule_based_scores() {
    let ws = Workspace::new();

    let value = ws.json(&["analyze", "--tenant", "acme", "--product", "p1"]);

    assert_eq!(value["status"], "completed");
    assert_eq!(value["title_score"], 85);
    assert_eq!(value["overall_score"], 69);
    assert_eq!(value["analysis_data"]["ai_powered"], false);
    assert_eq!(value["is_reviewed"], false);
}

#[test]
fn analyze_unknown_product_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["analyze", "--tenant", "acme", "--product", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn bulk_continues_past_missing_product() {
    let ws = Workspace::new();

    let value = ws.json(&[
        "bulk", "--tenant", "acme", "--product", "p1", "--product", "ghost",
    ]);

    assert_eq!(value["succeeded"], 1);
    assert_eq!(value["failed"], 1);
    assert_eq!(value["errors"][0]["product_id"], "ghost");
}

#[test]
fn bulk_all_then_stats() {
    let ws = Workspace::new();

    let bulk = ws.json(&["bulk", "--tenant", "acme", "--all"]);
    assert_eq!(bulk["succeeded"], 2);
    assert_eq!(bulk["failed"], 0);

    let stats = ws.json(&["stats", "--tenant", "acme"]);
    assert_eq!(stats["total_products"], 2);
    assert_eq!(stats["analyzed_count"], 2);
    assert_eq!(stats["pending"], 0);
}

#[test]
fn stats_for_unanalyzed_tenant_are_zero() {
    let ws = Workspace::new();

    let stats = ws.json(&["stats", "--tenant", "globex"]);

    assert_eq!(stats["total_products"], 1);
    assert_eq!(stats["analyzed_count"], 0);
    assert_eq!(stats["average_score"], 0.0);
    assert_eq!(stats["pending"], 1);
}

#[test]
fn review_flow_marks_result_reviewed() {
    let ws = Workspace::new();
    ws.json(&["analyze", "--tenant", "acme", "--product", "p1"]);

    ws.cmd()
        .args([
            "review", "--tenant", "acme", "--product", "p1", "--reviewer", "sam", "--notes",
            "looks fine",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("reviewed by sam"));

    let result = ws.json(&["result", "--tenant", "acme", "--product", "p1"]);
    assert_eq!(result["is_reviewed"], true);
    assert_eq!(result["reviewed_by"], "sam");
    assert_eq!(result["review_notes"], "looks fine");

    let listed = ws.json(&["results", "--tenant", "acme", "--status", "completed"]);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[test]
fn review_without_result_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["review", "--tenant", "acme", "--product", "p2", "--reviewer", "sam"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No analysis found"));
}

#[test]
fn results_filters_by_score() {
    let ws = Workspace::new();
    ws.json(&["bulk", "--tenant", "acme", "--all"]);

    let low = ws.json(&["results", "--tenant", "acme", "--max-score", "69"]);
    let ids: Vec<_> = low
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["product_id"].as_str().unwrap_or_default().to_string())
        .collect();

    assert_eq!(ids, vec!["p1"]);
}

#[test]
fn result_human_output_lists_dimension_scores() {
    let ws = Workspace::new();
    ws.json(&["analyze", "--tenant", "acme", "--product", "p1"]);

    ws.cmd()
        .args(["result", "--tenant", "acme", "--product", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title 85 | description 60"));
}

#[test]
fn fix_previews_title_rewrite() {
    let ws = Workspace::new();
    ws.json(&["analyze", "--tenant", "fixco", "--product", "loud"]);

    let patch = ws.json(&["fix", "--tenant", "fixco", "--product", "loud"]);

    assert_eq!(patch["title"], "Best Tent Ever Made For Camping");
    assert_eq!(patch["description"], Value::Null);
    assert_eq!(
        patch["applied"],
        serde_json::json!(["clean_special_chars", "convert_title_case"])
    );

    ws.cmd()
        .args(["fix", "--tenant", "fixco", "--product", "loud"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied: clean_special_chars, convert_title_case"));
}

#[test]
fn fix_without_result_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["fix", "--tenant", "fixco", "--product", "loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stored analysis"));
}

#[test]
fn seo_title_falls_back_without_provider() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("feed-doctor");
    cmd.current_dir(dir.path())
        .env("FEED_DOCTOR__LLM__PROVIDER", "none")
        .args(["seo-title", "--name", "camp STOVE", "--category", "cooking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Camp Stove - Cooking"));
}

#[test]
fn log_level_falls_back_to_config() {
    let ws = Workspace::new();

    ws.cmd()
        .env_remove("RUST_LOG")
        .env("FEED_DOCTOR__GENERAL__LOG_LEVEL", "debug")
        .args(["stats", "--tenant", "acme"])
        .assert()
        .success()
        .stderr(predicate::str::contains("AI provider ready"));

    ws.cmd()
        .env_remove("RUST_LOG")
        .env("FEED_DOCTOR__GENERAL__LOG_LEVEL", "debug")
        .args(["--log-level", "warn", "stats", "--tenant", "acme"])
        .assert()
        .success()
        .stderr(predicate::str::contains("AI provider ready").not());
}

#[test]
fn doctor_reports_json() {
    let ws = Workspace::new();

    let output = ws
        .cmd()
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["catalog"]["status"], "ok");
    assert_eq!(report["store"]["status"], "ok");
    assert_eq!(report["llm"]["status"], "warn");
    assert_eq!(report["overall"], "warn");
}
