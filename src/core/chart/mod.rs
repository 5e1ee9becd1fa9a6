pub mod range;
pub mod trend;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::core::computed::{
    compute_report_items, ComputedReportItem, GroupBy, ReportItem, ReportItemValue, SortDirection,
};
use crate::core::models::report::{parse_day_key, parse_report_date, Report};
use range::end_of_month;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Running total up to each day.
    Rolling,
    #[default]
    Daily,
    Monthly,
}

impl ChartKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "rolling" | "cumulative" => Some(Self::Rolling),
            "daily" => Some(Self::Daily),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// X coordinate: the day of month for date series, the label otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartX {
    Day(u32),
    Label(String),
}

/// A rendering-ready point. `y == None` means "no data", which is not zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDatum {
    pub x: ChartX,
    pub y: Option<f64>,
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
}

impl ChartDatum {
    /// The calendar date encoded in `key`, if any.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_report_date(&self.key)
    }
}

/// Round to two decimals when fractional; whole numbers pass unchanged.
/// Non-finite input is treated as "no data".
pub fn round_value(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 {
        Some(value)
    } else {
        Some((value * 100.0).round() / 100.0)
    }
}

/// Build one datum from a computed item.
///
/// Date series use the day of month as `x`; a key that is not a date falls
/// back to its label. `units` come from the selected report item.
pub fn create_datum(
    value: Option<f64>,
    item: &ComputedReportItem,
    group_by: &GroupBy,
    report_item: Option<ReportItem>,
) -> ChartDatum {
    let x = if group_by.is_date() {
        match parse_report_date(&item.id) {
            Some(date) => ChartX::Day(date.day()),
            None => ChartX::Label(item.id.clone()),
        }
    } else {
        ChartX::Label(item.label.clone())
    };
    ChartDatum {
        x,
        y: value.and_then(round_value),
        key: item.id.clone(),
        name: item.id.clone(),
        units: report_item.and_then(|r| item.units.get(r).map(str::to_string)),
        tooltip: None,
        show: None,
        child_name: None,
    }
}

/// Turn a report into chart points.
///
/// An absent report yields an empty series. Items are extracted newest
/// first; date series are then walked oldest first so a rolling total
/// accumulates forward in time and padding sees ascending keys. A `None`
/// contribution adds nothing to the rolling total.
pub fn transform_report(
    report: Option<&Report>,
    kind: ChartKind,
    group_by: &GroupBy,
    report_item: ReportItem,
    value: ReportItemValue,
) -> Vec<ChartDatum> {
    let Some(report) = report else {
        return Vec::new();
    };

    let mut items = compute_report_items(report, group_by, SortDirection::Desc);
    if group_by.is_date() {
        items.reverse();
    }

    let result: Vec<ChartDatum> = match kind {
        ChartKind::Daily | ChartKind::Monthly => items
            .iter()
            .map(|item| create_datum(item.value(report_item, value), item, group_by, Some(report_item)))
            .collect(),
        ChartKind::Rolling => {
            let mut acc: Vec<ChartDatum> = Vec::with_capacity(items.len());
            for item in &items {
                let prev = acc.last().and_then(|d| d.y).unwrap_or(0.0);
                let total = prev + item.value(report_item, value).unwrap_or(0.0);
                acc.push(create_datum(Some(total), item, group_by, Some(report_item)));
            }
            acc
        }
    };

    tracing::debug!(
        "Transformed {} items into {:?} series keyed by {}",
        items.len(),
        kind,
        group_by.key()
    );

    if group_by.is_date() {
        pad_computed_report_items(&result)
    } else {
        result
    }
}

/// Pad a single-month date series with null datums from the 1st up to the
/// first real day and from the day after the last real day to month end.
/// The real datums are kept untouched in the middle. Series keyed by month
/// (`2023-04`) are returned as is.
pub fn pad_computed_report_items(datums: &[ChartDatum]) -> Vec<ChartDatum> {
    let (Some(first), Some(last)) = (datums.first(), datums.last()) else {
        return Vec::new();
    };
    let (Some(first_date), Some(last_date)) =
        (parse_day_key(&first.key), parse_day_key(&last.key))
    else {
        return datums.to_vec();
    };

    let mut result = Vec::with_capacity(31);

    for day in 1..first_date.day() {
        if let Some(date) = first_date.with_day(day) {
            result.push(placeholder_datum(date));
        }
    }

    result.extend_from_slice(datums);

    let month_end = end_of_month(last_date).day();
    for day in (last_date.day() + 1)..=month_end {
        if let Some(date) = last_date.with_day(day) {
            result.push(placeholder_datum(date));
        }
    }
    result
}

fn placeholder_datum(date: NaiveDate) -> ChartDatum {
    let item = ComputedReportItem::placeholder(date.format("%Y-%m-%d").to_string());
    create_datum(None, &item, &GroupBy::Date, None)
}

/// Largest `y` in the series; 0 when empty. `None` values are skipped.
pub fn get_max_value(datums: &[ChartDatum]) -> f64 {
    datums
        .iter()
        .filter_map(|d| d.y)
        .fold(0.0, f64::max)
}
