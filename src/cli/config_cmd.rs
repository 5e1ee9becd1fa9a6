use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::core::config::AppConfig;

#[derive(Serialize)]
struct CheckReport {
    path: String,
    valid: bool,
    issues: Vec<String>,
}

pub fn init(opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    let path = AppConfig::default()
        .save()
        .context("Failed to generate config")?;
    match opts.format {
        OutputFormat::Text => {
            println!("Generated config at {}", path.display());
            println!("  Set COSTSCOPE_TOKEN or api.account before fetching reports.");
        }
        OutputFormat::Json => println!(
            "{}",
            opts.to_json(&serde_json::json!({ "path": path.display().to_string() }))?
        ),
    }
    Ok(())
}

pub fn check(opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `costscope config init` to create one.");
        return Ok(());
    }

    let config = AppConfig::load().context("Failed to load config")?;
    let issues = config.validate();
    let report = CheckReport {
        path: path.display().to_string(),
        valid: issues.is_empty(),
        issues,
    };

    match opts.format {
        OutputFormat::Json => println!("{}", opts.to_json(&report)?),
        OutputFormat::Text if report.valid => {
            println!("Config is valid: {}", report.path);
            println!("  API: {}", config.api.base_url);
            match &config.locale.catalog_path {
                Some(catalog) => println!("  Catalog: {}", catalog.display()),
                None => println!("  Catalog: built-in English"),
            }
        }
        OutputFormat::Text => {
            eprintln!("Config issues found in {}:", report.path);
            for issue in &report.issues {
                eprintln!("  - {}", issue);
            }
        }
    }
    if !report.valid {
        bail!("{} config issue(s) found", report.issues.len());
    }
    Ok(())
}
