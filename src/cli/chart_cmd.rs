use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::api::query::{get_query, ReportQuery, Resolution};
use crate::core::api::{ApiClient, ApiError};
use crate::core::chart::range::{
    get_date_range_string, get_month_range_string, RangeOptions, COST_INFRASTRUCTURE_LEGEND_KEY,
    COST_LEGEND_KEY, MONTH_LEGEND_KEY, USAGE_LEGEND_KEY,
};
use crate::core::chart::trend::{
    build_trend_series, chart_domain, chart_end_date, ChartDomain, TrendSeries,
};
use crate::core::chart::{get_max_value, transform_report, ChartDatum, ChartKind};
use crate::core::computed::{GroupBy, ReportItem, ReportItemValue, SortDirection};
use crate::core::config::AppConfig;
use crate::core::formatter::get_tooltip_label;
use crate::core::i18n::{MessageCatalog, Translator};
use crate::core::models::report::{Platform, ReportKind, Report};
use crate::core::store::fetch::FetchState;

pub struct ChartArgs {
    pub platform: String,
    pub report: String,
    pub kind: String,
    pub group_by: String,
    pub item: String,
    pub value: String,
    pub compare: bool,
    pub limit: u32,
}

/// A fully resolved chart request.
#[derive(Debug, Clone)]
pub(crate) struct ChartRequest {
    pub platform: Platform,
    pub report: ReportKind,
    pub kind: ChartKind,
    pub group_by: GroupBy,
    pub item: ReportItem,
    pub value: ReportItemValue,
    pub service: Option<String>,
    pub limit: u32,
}

impl ChartRequest {
    fn parse(args: &ChartArgs) -> Result<Self> {
        let Some(platform) = Platform::from_id(&args.platform) else {
            bail!("Unknown platform: '{}'", args.platform);
        };
        let Some(report) = ReportKind::from_id(&args.report) else {
            bail!("Unknown report: '{}'", args.report);
        };
        if !report.is_chartable() {
            bail!("The '{}' report lists keys and cannot be charted", report.id());
        }
        let Some(kind) = ChartKind::from_id(&args.kind) else {
            bail!("Unknown chart kind: '{}' (rolling|daily|monthly)", args.kind);
        };
        let Some(group_by) = GroupBy::from_id(&args.group_by) else {
            bail!("Unknown group-by: '{}'", args.group_by);
        };
        let Some(item) = ReportItem::from_id(&args.item) else {
            bail!("Unknown report item: '{}'", args.item);
        };
        let Some(value) = ReportItemValue::from_id(&args.value) else {
            bail!("Unknown value field: '{}'", args.value);
        };
        Ok(Self {
            platform,
            report,
            kind,
            group_by,
            item,
            value,
            service: None,
            limit: args.limit,
        })
    }

    /// Date series are fetched per day (or month); grouped series ask for the
    /// top items by cost over the whole month.
    pub(crate) fn query(&self, months_back: u32) -> ReportQuery {
        let resolution = if self.group_by.is_date() && self.kind != ChartKind::Monthly {
            Resolution::Daily
        } else {
            Resolution::Monthly
        };
        let mut query = ReportQuery::month(months_back, resolution);
        if !self.group_by.is_date() {
            query = query
                .group_by(&self.group_by, "*")
                .order_by("cost", SortDirection::Desc)
                .limit(self.limit);
        }
        if let Some(service) = &self.service {
            query = query.service(service);
        }
        query
    }

    pub(crate) fn legend_key(&self) -> &'static str {
        match (self.kind, self.item) {
            (ChartKind::Monthly, _) => MONTH_LEGEND_KEY,
            (_, ReportItem::Usage) => USAGE_LEGEND_KEY,
            (_, ReportItem::Infrastructure) => COST_INFRASTRUCTURE_LEGEND_KEY,
            _ => COST_LEGEND_KEY,
        }
    }

    pub(crate) fn series_name(&self) -> String {
        format!("{}_{}", self.report.id(), self.item.id())
    }
}

/// Run one report request through the fetch-status machine.
pub(crate) async fn fetch_report(
    client: &ApiClient,
    platform: Platform,
    kind: ReportKind,
    query: &ReportQuery,
) -> FetchState<Report, ApiError> {
    let state: FetchState<Report, ApiError> = FetchState::default().request();
    match client.run_report(platform, kind, &get_query(query)).await {
        Ok(report) => state.succeed(report),
        Err(e) => {
            tracing::warn!("{} {} report failed: {}", platform.id(), kind.id(), e);
            state.fail(e)
        }
    }
}

fn with_tooltips(mut data: Vec<ChartDatum>, group_by: &GroupBy) -> Vec<ChartDatum> {
    for datum in &mut data {
        let label = get_tooltip_label(datum, group_by, None);
        if !label.is_empty() {
            datum.tooltip = Some(label);
        }
    }
    data
}

#[derive(Debug, Serialize)]
pub(crate) struct ChartPayload {
    pub title: String,
    pub platform: Platform,
    pub report: ReportKind,
    pub kind: ChartKind,
    pub group_by: GroupBy,
    pub date_range: String,
    pub series: Vec<TrendSeries>,
    pub max_value: f64,
    pub domain: ChartDomain,
    pub end_date: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Shape fetched reports into the series a chart shows.
///
/// Date series become a current-vs-previous pair with range legends. A
/// grouped series is a single list with the month name as legend.
pub(crate) fn build_chart(
    t: &dyn Translator,
    request: &ChartRequest,
    title: String,
    current: &FetchState<Report, ApiError>,
    previous: Option<&FetchState<Report, ApiError>>,
    today: NaiveDate,
) -> ChartPayload {
    let transform = |state: &FetchState<Report, ApiError>| {
        with_tooltips(
            transform_report(
                state.data.as_ref(),
                request.kind,
                &request.group_by,
                request.item,
                request.value,
            ),
            &request.group_by,
        )
    };

    let current_data = transform(current);
    let name = request.series_name();
    let series = match previous {
        Some(previous) if request.group_by.is_date() => build_trend_series(
            t,
            request.legend_key(),
            &name,
            current_data.clone(),
            transform(previous),
            today,
        ),
        _ => {
            let legend = if request.group_by.is_date() {
                build_trend_series(t, request.legend_key(), &name, current_data.clone(), Vec::new(), today)
                    .pop()
                    .map(|s| s.legend)
                    .unwrap_or_default()
            } else {
                get_month_range_string(t, &current_data, MONTH_LEGEND_KEY, 0, today).0
            };
            vec![TrendSeries {
                child_name: format!("current_{}", name),
                legend,
                data: current_data.clone(),
            }]
        }
    };

    let all: Vec<&[ChartDatum]> = series.iter().map(|s| s.data.as_slice()).collect();
    let errors = std::iter::once(current)
        .chain(previous)
        .filter_map(|s| s.error.as_ref().map(ToString::to_string))
        .collect();

    ChartPayload {
        title,
        platform: request.platform,
        report: request.report,
        kind: request.kind,
        group_by: request.group_by.clone(),
        date_range: get_date_range_string(t, &current_data, RangeOptions::new(true, false, 0), today),
        max_value: all.iter().map(|s| get_max_value(s)).fold(0.0, f64::max),
        domain: chart_domain(&all),
        end_date: chart_end_date(&all, today),
        series,
        errors,
    }
}

pub(crate) fn print_chart(
    payload: &ChartPayload,
    t: &dyn Translator,
    opts: &OutputOptions,
) -> Result<()> {
    match opts.format {
        OutputFormat::Text => {
            let title = format!("{} ({})", payload.title, payload.date_range);
            println!(
                "{}",
                renderer::render_chart(
                    &title,
                    &payload.series,
                    &payload.group_by,
                    &payload.domain,
                    t,
                    opts.use_color
                )
            );
            for error in &payload.errors {
                eprintln!("Error: {}", error);
            }
        }
        OutputFormat::Json => println!("{}", opts.to_json(payload)?),
    }
    Ok(())
}

pub async fn run(args: ChartArgs, opts: &OutputOptions) -> Result<()> {
    let request = ChartRequest::parse(&args)?;
    let config = AppConfig::load().context("Failed to load config")?;
    let catalog = MessageCatalog::load_or_default(config.locale.catalog_path.as_deref());
    let client = ApiClient::from_config(&config.api).context("Failed to create API client")?;
    let today = chrono::Local::now().date_naive();

    let current_query = request.query(0);
    let previous_query = request.query(1);
    let (current, previous) = if args.compare {
        let (current, previous) = tokio::join!(
            fetch_report(&client, request.platform, request.report, &current_query),
            fetch_report(&client, request.platform, request.report, &previous_query),
        );
        (current, Some(previous))
    } else {
        (
            fetch_report(&client, request.platform, request.report, &current_query).await,
            None,
        )
    };

    if let Some(error) = &current.error {
        if current.data.is_none() {
            return Err(error.clone()).context("Failed to fetch report");
        }
    }

    let title = format!("{} {}", request.platform.display_name(), request.report.id());
    let payload = build_chart(&catalog, &request, title, &current, previous.as_ref(), today);
    print_chart(&payload, &catalog, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(group_by: GroupBy, kind: ChartKind) -> ChartRequest {
        ChartRequest {
            platform: Platform::Ocp,
            report: ReportKind::Cost,
            kind,
            group_by,
            item: ReportItem::Cost,
            value: ReportItemValue::Total,
            service: None,
            limit: 5,
        }
    }

    fn report(json: serde_json::Value) -> FetchState<Report, ApiError> {
        FetchState::default().succeed(serde_json::from_value(json).unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, 20).unwrap()
    }

    #[test]
    fn parse_rejects_unknown_ids() {
        let args = ChartArgs {
            platform: "gcp".to_string(),
            report: "cost".to_string(),
            kind: "daily".to_string(),
            group_by: "date".to_string(),
            item: "cost".to_string(),
            value: "total".to_string(),
            compare: false,
            limit: 5,
        };
        assert!(ChartRequest::parse(&args).is_err());
    }

    #[test]
    fn parse_rejects_tag_report() {
        let args = ChartArgs {
            platform: "aws".to_string(),
            report: "tags".to_string(),
            kind: "daily".to_string(),
            group_by: "date".to_string(),
            item: "cost".to_string(),
            value: "total".to_string(),
            compare: false,
            limit: 5,
        };
        let err = ChartRequest::parse(&args).unwrap_err();
        assert!(err.to_string().contains("cannot be charted"));
    }

    #[test]
    fn grouped_query_orders_by_cost() {
        let q = get_query(&request(GroupBy::Project, ChartKind::Daily).query(0));
        assert!(q.contains("filter[resolution]=monthly"));
        assert!(q.contains("group_by[project]=*"));
        assert!(q.contains("order_by[cost]=desc"));
        assert!(q.contains("filter[limit]=5"));

        let q = get_query(&request(GroupBy::Date, ChartKind::Rolling).query(1));
        assert!(q.contains("filter[resolution]=daily"));
        assert!(q.contains("filter[time_scope_value]=-2"));
        assert!(!q.contains("group_by"));
    }

    #[test]
    fn rolling_chart_with_previous_month() {
        let current = report(serde_json::json!({
            "data": [
                { "date": "2023-04-02", "values": [ { "date": "2023-04-02", "cost": { "total": { "value": 5, "units": "USD" } } } ] },
                { "date": "2023-04-01", "values": [ { "date": "2023-04-01", "cost": { "total": { "value": 10, "units": "USD" } } } ] }
            ]
        }));
        let previous = FetchState::default()
            .request()
            .fail(ApiError::Http { status: 500, body: String::new() });
        let payload = build_chart(
            &MessageCatalog::english(),
            &request(GroupBy::Date, ChartKind::Rolling),
            "Cost".to_string(),
            &current,
            Some(&previous),
            today(),
        );

        assert_eq!(payload.series.len(), 2);
        assert_eq!(payload.series[0].child_name, "previous_cost_cost");
        assert!(payload.series[0].data.is_empty());
        let current = &payload.series[1].data;
        assert_eq!(current.len(), 30);
        assert_eq!(current[0].y, Some(10.0));
        assert_eq!(current[1].y, Some(15.0));
        assert_eq!(current[2].y, None);
        assert_eq!(current[0].tooltip.as_deref(), Some("01 Apr 2023 $10.00"));
        assert_eq!(payload.series[1].legend, "Apr 1-30 cost");
        assert_eq!(payload.max_value, 15.0);
        assert_eq!(payload.domain.y, Some((0.0, 17.0)));
        assert_eq!(payload.end_date, 30);
        assert_eq!(payload.errors.len(), 1);
    }

    #[test]
    fn grouped_chart_is_single_series() {
        let current = report(serde_json::json!({
            "data": [ { "date": "2023-04", "projects": [
                { "project": "web", "values": [ { "date": "2023-04", "project": "web", "cost": { "total": { "value": 7, "units": "USD" } } } ] },
                { "project": "db", "values": [ { "date": "2023-04", "project": "db", "cost": { "total": { "value": 3, "units": "USD" } } } ] }
            ] } ]
        }));
        let payload = build_chart(
            &MessageCatalog::english(),
            &request(GroupBy::Project, ChartKind::Daily),
            "Top projects".to_string(),
            &current,
            None,
            today(),
        );
        assert_eq!(payload.series.len(), 1);
        let keys: Vec<&str> = payload.series[0].data.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["web", "db"]);
        assert_eq!(payload.series[0].legend, "April");
        assert_eq!(payload.series[0].data[0].tooltip.as_deref(), Some("web"));
    }

    #[test]
    fn legend_keys_follow_item_and_kind() {
        let mut r = request(GroupBy::Date, ChartKind::Daily);
        assert_eq!(r.legend_key(), COST_LEGEND_KEY);
        r.item = ReportItem::Usage;
        assert_eq!(r.legend_key(), USAGE_LEGEND_KEY);
        r.kind = ChartKind::Monthly;
        assert_eq!(r.legend_key(), MONTH_LEGEND_KEY);
    }
}
