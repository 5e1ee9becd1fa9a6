use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::range::{get_cost_range_string, get_date_range, RangeOptions};
use super::{get_max_value, ChartDatum};
use crate::core::i18n::Translator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDomain {
    pub x: (u32, u32),
    /// Only set when some series has a positive maximum.
    pub y: Option<(f64, f64)>,
}

/// X spans a full month; Y spans 0 to the overall max plus 10%, rounded up.
pub fn chart_domain(series: &[&[ChartDatum]]) -> ChartDomain {
    let max_value = series
        .iter()
        .map(|s| get_max_value(s))
        .fold(0.0, f64::max);
    let max = if max_value > 0.0 {
        (max_value + max_value * 0.1).ceil()
    } else {
        0.0
    };
    ChartDomain {
        x: (1, 31),
        y: (max > 0.0).then_some((0.0, max)),
    }
}

/// The last day of month covered by any non-empty series, 31 when all are empty.
pub fn chart_end_date(series: &[&[ChartDatum]], today: NaiveDate) -> u32 {
    series
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| get_date_range(s, RangeOptions::new(true, true, 0), today).1.day())
        .max()
        .unwrap_or(31)
}

/// One named line of a current-vs-previous trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub child_name: String,
    pub legend: String,
    pub data: Vec<ChartDatum>,
}

/// Current and previous month series with their legend labels. The previous
/// month legend always covers the whole month.
pub fn build_trend_series(
    t: &dyn Translator,
    legend_key: &str,
    name: &str,
    current: Vec<ChartDatum>,
    previous: Vec<ChartDatum>,
    today: NaiveDate,
) -> Vec<TrendSeries> {
    let previous_legend =
        get_cost_range_string(t, &previous, legend_key, RangeOptions::new(true, true, 1), today);
    let current_legend =
        get_cost_range_string(t, &current, legend_key, RangeOptions::new(true, false, 0), today);
    vec![
        TrendSeries {
            child_name: format!("previous_{}", name),
            legend: previous_legend,
            data: with_child_name(previous, &format!("previous_{}", name)),
        },
        TrendSeries {
            child_name: format!("current_{}", name),
            legend: current_legend,
            data: with_child_name(current, &format!("current_{}", name)),
        },
    ]
}

fn with_child_name(mut data: Vec<ChartDatum>, name: &str) -> Vec<ChartDatum> {
    for d in &mut data {
        d.child_name = Some(name.to_string());
    }
    data
}
