use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::chart_cmd::{build_chart, fetch_report, print_chart, ChartPayload, ChartRequest};
use crate::cli::output::{OutputFormat, OutputOptions};
use crate::core::api::query::ReportQuery;
use crate::core::api::reports::report_path;
use crate::core::api::ApiClient;
use crate::core::computed::{GroupBy, ReportItem, ReportItemValue};
use crate::core::config::AppConfig;
use crate::core::i18n::{MessageCatalog, MessageParams, Translator};
use crate::core::models::report::Platform;
use crate::core::store::dashboard::{DashboardAction, DashboardTab, DashboardWidget};
use crate::core::store::{Action, Store};

const TOP_ITEMS: u32 = 5;

#[derive(Serialize)]
struct WidgetPayload<'a> {
    widget: &'a DashboardWidget,
    trend: ChartPayload,
    top: ChartPayload,
}

/// The trend request for a widget and the grouped request for its current tab.
fn widget_requests(platform: Platform, widget: &DashboardWidget) -> (ChartRequest, ChartRequest) {
    let value = match widget.report_item {
        ReportItem::Usage => ReportItemValue::None,
        _ => ReportItemValue::Total,
    };
    let trend = ChartRequest {
        platform,
        report: widget.report_kind,
        kind: widget.chart_kind,
        group_by: GroupBy::Date,
        item: widget.report_item,
        value,
        service: widget.service_filter.clone(),
        limit: TOP_ITEMS,
    };
    let top = ChartRequest {
        group_by: widget.current_tab.group_by(),
        kind: crate::core::chart::ChartKind::Daily,
        ..trend.clone()
    };
    (trend, top)
}

/// Queries for the current trend, the previous month's trend, and the top items.
fn widget_queries(trend: &ChartRequest, top: &ChartRequest) -> [ReportQuery; 3] {
    [trend.query(0), trend.query(1), top.query(0)]
}

/// Apply a `--tab` selection through the dashboard slice.
fn select_tab(store: &mut Store, widget: Option<u32>, tab: Option<&str>) -> Result<()> {
    let Some(tab) = tab else {
        return Ok(());
    };
    let Some(tab_id) = DashboardTab::from_id(tab) else {
        bail!("Unknown tab: '{}'", tab);
    };
    let Some(id) = widget else {
        bail!("--tab requires --widget");
    };
    let Some(current) = store.dashboard.widget(id) else {
        bail!("Unknown widget: {}", id);
    };
    if !current.available_tabs.contains(&tab_id) {
        bail!("Widget {} has no '{}' tab", id, tab);
    }
    store.dispatch(Action::Dashboard(DashboardAction::SetWidgetTab { id, tab: tab_id }));
    Ok(())
}

pub async fn run(
    platform: &str,
    widget: Option<u32>,
    tab: Option<String>,
    opts: &OutputOptions,
) -> Result<()> {
    let Some(platform) = Platform::from_id(platform) else {
        bail!("Unknown platform: '{}'", platform);
    };
    let mut store = Store::new();
    select_tab(&mut store, widget, tab.as_deref())?;

    let config = AppConfig::load().context("Failed to load config")?;
    let catalog = MessageCatalog::load_or_default(config.locale.catalog_path.as_deref());
    let client = ApiClient::from_config(&config.api).context("Failed to create API client")?;
    let today = chrono::Local::now().date_naive();

    let dashboard = store.dashboard.clone();
    let widgets: Vec<&DashboardWidget> = dashboard
        .ordered()
        .into_iter()
        .filter(|w| widget.map_or(true, |id| w.id == id))
        .filter(|w| {
            let supported = report_path(platform, w.report_kind).is_some();
            if !supported {
                tracing::debug!("Skipping widget {} for {}", w.id, platform.id());
            }
            supported
        })
        .collect();
    if widgets.is_empty() {
        bail!("No dashboard widgets for {}", platform.display_name());
    }

    let mut payloads = Vec::with_capacity(widgets.len());
    for w in widgets {
        let (trend_request, top_request) = widget_requests(platform, w);
        let [current_query, previous_query, top_query] = widget_queries(&trend_request, &top_request);
        let (current, previous, top) = tokio::join!(
            fetch_report(&client, platform, w.report_kind, &current_query),
            fetch_report(&client, platform, w.report_kind, &previous_query),
            fetch_report(&client, platform, w.report_kind, &top_query),
        );
        let title = catalog.translate(&w.title_key, &MessageParams::new());
        let tab_title = catalog.translate(w.current_tab.title_key(), &MessageParams::new());
        payloads.push(WidgetPayload {
            widget: w,
            trend: build_chart(&catalog, &trend_request, title, &current, Some(&previous), today),
            top: build_chart(&catalog, &top_request, tab_title, &top, None, today),
        });
    }

    match opts.format {
        OutputFormat::Text => {
            for (i, payload) in payloads.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_chart(&payload.trend, &catalog, opts)?;
                println!();
                print_chart(&payload.top, &catalog, opts)?;
            }
        }
        OutputFormat::Json => println!("{}", opts.to_json(&payloads)?),
    }
    Ok(())
}
