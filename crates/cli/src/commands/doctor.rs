//! Doctor command - validate configuration and show status

use anyhow::Result;
use feed_doctor_adapters::{catalog::FsCatalog, store::SqliteAnalysisStore};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use super::{GlobalOpts, build_provider};
use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    catalog: CheckResult,
    store: CheckResult,
    llm: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, global: GlobalOpts) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        catalog: CheckResult::error("Not checked"),
        store: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match global.load_config() {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.catalog = check_catalog(&config.general.catalog_path).await;
        report.store = check_store(&config.general.state_db_path).await;
        report.llm = check_llm(config);
    }

    let checks = [&report.config, &report.catalog, &report.store, &report.llm];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_catalog(path: &Path) -> CheckResult {
    let catalog = match FsCatalog::new(path) {
        Ok(c) => c,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    match catalog.load().await {
        Ok(file) => {
            let tenants: BTreeSet<&str> =
                file.products.iter().map(|p| p.tenant_id.as_str()).collect();
            let active_rules = file.rules.iter().filter(|r| r.is_active).count();

            let message = format!(
                "{} products across {} tenants, {} active rules",
                file.products.len(),
                tenants.len(),
                active_rules
            );
            let result = if file.products.is_empty() {
                CheckResult::warn(message)
            } else {
                CheckResult::ok(message)
            };

            result.with_details(serde_json::json!({
                "path": path.display().to_string(),
                "products": file.products.len(),
                "tenants": tenants,
                "rules": file.rules.len(),
                "active_rules": active_rules,
            }))
        }
        Err(e) => CheckResult::error(format!("Failed to load catalog: {}", e)),
    }
}

async fn check_store(path: &Path) -> CheckResult {
    match SqliteAnalysisStore::new(path).await {
        Ok(_) => CheckResult::ok(format!("Results database: {}", path.display())),
        Err(e) => CheckResult::error(format!("Failed to open {}: {}", path.display(), e)),
    }
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let provider = config.llm.provider.as_str();
    let model = &config.llm.model;

    if provider == "none" || provider.is_empty() {
        return CheckResult::warn("No AI provider configured (rule-based scoring only)");
    }

    match build_provider(config) {
        Ok(built) if built.is_configured() => {
            CheckResult::ok(format!("Provider: {}, Model: {}", built.name(), model))
        }
        Ok(_) => CheckResult::warn(format!(
            "Provider: {}, Model: {}, API key not set (rule-based scoring only)",
            provider, model
        )),
        Err(e) => CheckResult::error(format!("{:#}", e)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("feed-doctor Doctor Report");
    println!("=========================");
    println!();

    print_check("Config", &report.config);
    print_check("Catalog", &report.catalog);
    print_check("Results Store", &report.store);
    print_check("AI Provider", &report.llm);

    println!();
    println!(
        "{} Overall: {}",
        status_symbol(&report.overall),
        report.overall.to_uppercase()
    );

    if report.overall != "error" {
        println!();
        println!("Ready! Try: feed-doctor analyze --tenant <id> --product <id>");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    println!(
        "{} {}: {}",
        status_symbol(&result.status),
        name,
        result.message
    );
}

fn status_symbol(status: &str) -> &'static str {
    match status {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    }
}
