use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::core::api::query::{export_query, ExportSelection, ReportQuery, Resolution};
use crate::core::api::reports::report_url_path;
use crate::core::api::ApiClient;
use crate::core::computed::GroupBy;
use crate::core::config::AppConfig;
use crate::core::models::report::{Platform, ReportKind};

pub struct ExportArgs {
    pub platform: String,
    pub report: String,
    pub group_by: String,
    pub resolution: String,
    pub months_back: u32,
    pub items: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ExportPayload {
    query: String,
    path: String,
    url: String,
}

fn build(args: &ExportArgs) -> Result<(Platform, ReportKind, String)> {
    let Some(platform) = Platform::from_id(&args.platform) else {
        bail!("Unknown platform: '{}'", args.platform);
    };
    let Some(report) = ReportKind::from_id(&args.report) else {
        bail!("Unknown report: '{}'", args.report);
    };
    let Some(group_by) = GroupBy::from_id(&args.group_by) else {
        bail!("Unknown group-by: '{}'", args.group_by);
    };
    if group_by.is_date() {
        bail!("Exports are grouped by a label such as project or account, not date");
    }
    let Some(resolution) = Resolution::from_id(&args.resolution) else {
        bail!("Unknown resolution: '{}' (daily|monthly)", args.resolution);
    };
    let selection = if args.items.is_empty() {
        ExportSelection::All
    } else {
        ExportSelection::Items(args.items.clone())
    };
    let base = ReportQuery::month(args.months_back, resolution).group_by(&group_by, "*");
    Ok((platform, report, export_query(&base, resolution, &group_by, &selection)))
}

pub fn run(args: ExportArgs, opts: &OutputOptions) -> Result<()> {
    let (platform, report, query) = build(&args)?;
    let path = report_url_path(platform, report, &query)?;
    let config = AppConfig::load().context("Failed to load config")?;
    let client = ApiClient::from_config(&config.api).context("Failed to create API client")?;
    let url = client.url(&path)?;

    let payload = ExportPayload {
        query,
        path,
        url: url.to_string(),
    };
    match opts.format {
        OutputFormat::Text => println!("{}", payload.url),
        OutputFormat::Json => println!("{}", opts.to_json(&payload)?),
    }
    Ok(())
}
