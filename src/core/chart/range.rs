use chrono::{Datelike, Months, NaiveDate};

use super::ChartDatum;
use crate::core::i18n::{MessageParams, Translator};

pub const COST_LEGEND_KEY: &str = "chart.cost_legend_label";
pub const COST_INFRASTRUCTURE_LEGEND_KEY: &str = "chart.cost_infrastructure_legend_label";
pub const USAGE_LEGEND_KEY: &str = "chart.usage_legend_label";
pub const MONTH_LEGEND_KEY: &str = "chart.month_legend_label";
pub const DATE_RANGE_KEY: &str = "chart.date_range";

/// How a `[start, end]` pair is widened before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeOptions {
    pub first_of_month: bool,
    pub last_of_month: bool,
    /// Months to step back when the series is empty.
    pub offset: u32,
}

impl RangeOptions {
    pub fn new(first_of_month: bool, last_of_month: bool, offset: u32) -> Self {
        Self {
            first_of_month,
            last_of_month,
            offset,
        }
    }
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// The first and last datum dates, or `[first of month, today]` shifted back
/// `offset` months when the series is empty (or its keys are not dates).
pub fn get_datum_date_range(
    datums: &[ChartDatum],
    offset: u32,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let bounds = datums
        .first()
        .and_then(ChartDatum::date)
        .zip(datums.last().and_then(ChartDatum::date));
    if let Some(range) = bounds {
        return range;
    }

    let shifted = today
        .checked_sub_months(Months::new(offset))
        .unwrap_or(today);
    (start_of_month(shifted), shifted)
}

pub fn get_date_range(
    datums: &[ChartDatum],
    opts: RangeOptions,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let (mut start, mut end) = get_datum_date_range(datums, opts.offset, today);
    if opts.first_of_month {
        start = start_of_month(start);
    }
    if opts.last_of_month {
        end = end_of_month(end);
    }
    (start, end)
}

fn range_params(start: NaiveDate, end: NaiveDate, zero_pad: bool) -> MessageParams {
    let day = |d: NaiveDate| {
        if zero_pad {
            format!("{:02}", d.day())
        } else {
            d.day().to_string()
        }
    };
    MessageParams::new()
        .with("month", start.month0())
        .with("startDate", day(start))
        .with("endDate", day(end))
        .with("year", end.year())
        .count(i64::from(end.day()))
}

/// `chart.date_range` with zero-padded days.
pub fn get_date_range_string(
    t: &dyn Translator,
    datums: &[ChartDatum],
    opts: RangeOptions,
    today: NaiveDate,
) -> String {
    let (start, end) = get_date_range(datums, opts, today);
    t.translate(DATE_RANGE_KEY, &range_params(start, end, true))
}

/// Month labels for the start and end of the (first-of-month) range.
pub fn get_month_range_string(
    t: &dyn Translator,
    datums: &[ChartDatum],
    key: &str,
    offset: u32,
    today: NaiveDate,
) -> (String, String) {
    let (start, end) = get_date_range(datums, RangeOptions::new(true, false, offset), today);
    (
        t.translate(key, &MessageParams::new().with("month", start.month0())),
        t.translate(key, &MessageParams::new().with("month", end.month0())),
    )
}

pub fn get_cost_range_string(
    t: &dyn Translator,
    datums: &[ChartDatum],
    key: &str,
    opts: RangeOptions,
    today: NaiveDate,
) -> String {
    let (start, end) = get_date_range(datums, opts, today);
    t.translate(key, &range_params(start, end, false))
}

pub fn get_usage_range_string(
    t: &dyn Translator,
    datums: &[ChartDatum],
    key: &str,
    opts: RangeOptions,
    today: NaiveDate,
) -> String {
    get_cost_range_string(t, datums, key, opts, today)
}
