use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::models::report::{MetricBreakdown, ReportAmount, Report, ReportValue};

/// What a computed item is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Date,
    Project,
    Cluster,
    Node,
    Account,
    Service,
    Region,
    Tag(String),
}

impl GroupBy {
    pub fn from_id(id: &str) -> Option<Self> {
        if let Some(tag) = id.strip_prefix("tag:") {
            return if tag.is_empty() {
                None
            } else {
                Some(Self::Tag(tag.to_string()))
            };
        }
        match id.to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "project" => Some(Self::Project),
            "cluster" => Some(Self::Cluster),
            "node" => Some(Self::Node),
            "account" => Some(Self::Account),
            "service" => Some(Self::Service),
            "region" => Some(Self::Region),
            _ => None,
        }
    }

    /// The field name used in report values and `group_by[...]` query keys.
    pub fn key(&self) -> &str {
        match self {
            Self::Date => "date",
            Self::Project => "project",
            Self::Cluster => "cluster",
            Self::Node => "node",
            Self::Account => "account",
            Self::Service => "service",
            Self::Region => "region",
            Self::Tag(key) => key,
        }
    }

    /// The `group_by[...]` query parameter name.
    pub fn query_key(&self) -> String {
        match self {
            Self::Tag(key) => format!("tag:{}", key),
            other => other.key().to_string(),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Which metric group a chart reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportItem {
    #[default]
    Cost,
    Infrastructure,
    Supplementary,
    Usage,
}

impl ReportItem {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "cost" => Some(Self::Cost),
            "infrastructure" => Some(Self::Infrastructure),
            "supplementary" => Some(Self::Supplementary),
            "usage" => Some(Self::Usage),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Infrastructure => "infrastructure",
            Self::Supplementary => "supplementary",
            Self::Usage => "usage",
        }
    }
}

/// Which sub-value of a metric group a chart reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportItemValue {
    None,
    Markup,
    Raw,
    #[default]
    Total,
    Usage,
}

impl ReportItemValue {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "markup" => Some(Self::Markup),
            "raw" => Some(Self::Raw),
            "total" => Some(Self::Total),
            "usage" => Some(Self::Usage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueSet {
    pub raw: Option<f64>,
    pub markup: Option<f64>,
    pub usage: Option<f64>,
    pub total: Option<f64>,
}

impl ValueSet {
    pub fn get(&self, subfield: ReportItemValue) -> Option<f64> {
        match subfield {
            ReportItemValue::Raw => self.raw,
            ReportItemValue::Markup => self.markup,
            ReportItemValue::Usage => self.usage,
            ReportItemValue::Total | ReportItemValue::None => self.total,
        }
    }

    fn accumulate(&mut self, breakdown: &MetricBreakdown) {
        self.raw = add_opt(self.raw, amount(&breakdown.raw));
        self.markup = add_opt(self.markup, amount(&breakdown.markup));
        self.usage = add_opt(self.usage, amount(&breakdown.usage));
        self.total = add_opt(self.total, amount(&breakdown.total));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Units {
    pub cost: Option<String>,
    pub infrastructure: Option<String>,
    pub supplementary: Option<String>,
    pub usage: Option<String>,
}

impl Units {
    pub fn get(&self, item: ReportItem) -> Option<&str> {
        match item {
            ReportItem::Cost => self.cost.as_deref(),
            ReportItem::Infrastructure => self.infrastructure.as_deref(),
            ReportItem::Supplementary => self.supplementary.as_deref(),
            ReportItem::Usage => self.usage.as_deref(),
        }
    }
}

/// One aggregated data point, keyed by date or group label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComputedReportItem {
    pub id: String,
    pub label: String,
    pub cost: ValueSet,
    pub infrastructure: ValueSet,
    pub supplementary: ValueSet,
    pub usage: Option<f64>,
    pub units: Units,
}

impl ComputedReportItem {
    /// An item carrying only an id, used for placeholder datums.
    pub fn placeholder(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            ..Default::default()
        }
    }

    /// Usage has a single flat value, so any sub-value resolves to it.
    pub fn value(&self, item: ReportItem, subfield: ReportItemValue) -> Option<f64> {
        match item {
            ReportItem::Cost => self.cost.get(subfield),
            ReportItem::Infrastructure => self.infrastructure.get(subfield),
            ReportItem::Supplementary => self.supplementary.get(subfield),
            ReportItem::Usage => self.usage,
        }
    }

    fn accumulate(&mut self, value: &ReportValue) {
        if let Some(cost) = &value.cost {
            self.cost.accumulate(cost);
            fill_units(&mut self.units.cost, cost);
        }
        if let Some(infra) = &value.infrastructure {
            self.infrastructure.accumulate(infra);
            fill_units(&mut self.units.infrastructure, infra);
        }
        if let Some(supp) = &value.supplementary {
            self.supplementary.accumulate(supp);
            fill_units(&mut self.units.supplementary, supp);
        }
        if let Some(usage) = &value.usage {
            self.usage = add_opt(self.usage, usage.value);
            if self.units.usage.is_none() {
                self.units.usage = usage.units.clone();
            }
        }
    }
}

/// Aggregate a report into one item per date or group label, sorted by id.
pub fn compute_report_items(
    report: &Report,
    group_by: &GroupBy,
    direction: SortDirection,
) -> Vec<ComputedReportItem> {
    let mut items: BTreeMap<String, ComputedReportItem> = BTreeMap::new();

    for entry in &report.data {
        for value in entry.all_values() {
            let id = match group_by {
                GroupBy::Date => value.date.clone().unwrap_or_else(|| entry.date.clone()),
                other => match value.label(other.key()) {
                    Some(label) => label,
                    None => {
                        tracing::debug!(
                            "Skipping value on {} without a '{}' label",
                            entry.date,
                            other.key()
                        );
                        continue;
                    }
                },
            };
            items
                .entry(id.clone())
                .or_insert_with(|| ComputedReportItem::placeholder(id))
                .accumulate(&value);
        }
    }

    let mut result: Vec<ComputedReportItem> = items.into_values().collect();
    if direction == SortDirection::Desc {
        result.reverse();
    }
    result
}

fn amount(a: &Option<ReportAmount>) -> Option<f64> {
    a.as_ref().and_then(|a| a.value)
}

fn add_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x),
        (Some(x), Some(y)) => Some(x + y),
    }
}

fn fill_units(slot: &mut Option<String>, breakdown: &MetricBreakdown) {
    if slot.is_some() {
        return;
    }
    *slot = [&breakdown.total, &breakdown.raw, &breakdown.markup, &breakdown.usage]
        .into_iter()
        .find_map(|a| a.as_ref().and_then(|a| a.units.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        serde_json::from_str(
            r#"{ "data": [
                { "date": "2023-04-02", "values": [
                    { "date": "2023-04-02", "project": "web", "cost": { "total": { "value": 5, "units": "USD" }, "raw": { "value": 4, "units": "USD" } } },
                    { "date": "2023-04-02", "project": "db", "cost": { "total": { "value": 2.5, "units": "USD" } } }
                ] },
                { "date": "2023-04-01", "values": [
                    { "date": "2023-04-01", "project": "web", "cost": { "total": { "value": 1, "units": "USD" } }, "usage": { "value": 3, "units": "GB-Mo" } },
                    { "date": "2023-04-01", "cost": { "total": { "value": 9, "units": "USD" } } }
                ] }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn group_by_date_sums_values_per_day() {
        let items = compute_report_items(&report(), &GroupBy::Date, SortDirection::Asc);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "2023-04-01");
        assert_eq!(items[0].cost.total, Some(10.0));
        assert_eq!(items[0].usage, Some(3.0));
        assert_eq!(items[0].units.usage.as_deref(), Some("GB-Mo"));
        assert_eq!(items[1].id, "2023-04-02");
        assert_eq!(items[1].cost.total, Some(7.5));
        assert_eq!(items[1].cost.raw, Some(4.0));
        assert_eq!(items[1].units.cost.as_deref(), Some("USD"));
    }

    #[test]
    fn descending_sort_reverses_ids() {
        let items = compute_report_items(&report(), &GroupBy::Date, SortDirection::Desc);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2023-04-02", "2023-04-01"]);
    }

    #[test]
    fn group_by_label_skips_unlabelled_values() {
        let items = compute_report_items(&report(), &GroupBy::Project, SortDirection::Asc);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["db", "web"]);
        let web = &items[1];
        assert_eq!(web.cost.total, Some(6.0));
        assert_eq!(web.label, "web");
    }

    #[test]
    fn missing_metric_stays_none() {
        let items = compute_report_items(&report(), &GroupBy::Date, SortDirection::Asc);
        assert_eq!(items[1].usage, None);
        assert_eq!(items[1].infrastructure.total, None);
        assert_eq!(items[1].value(ReportItem::Supplementary, ReportItemValue::Total), None);
    }

    #[test]
    fn value_selects_metric_and_subfield() {
        let items = compute_report_items(&report(), &GroupBy::Date, SortDirection::Asc);
        let day2 = &items[1];
        assert_eq!(day2.value(ReportItem::Cost, ReportItemValue::Raw), Some(4.0));
        assert_eq!(day2.value(ReportItem::Cost, ReportItemValue::None), Some(7.5));
        assert_eq!(
            items[0].value(ReportItem::Usage, ReportItemValue::Markup),
            Some(3.0)
        );
    }

    #[test]
    fn group_by_parses_tags() {
        assert_eq!(GroupBy::from_id("tag:app"), Some(GroupBy::Tag("app".to_string())));
        assert_eq!(GroupBy::from_id("tag:"), None);
        assert_eq!(GroupBy::Tag("app".into()).query_key(), "tag:app");
        assert_eq!(GroupBy::Tag("app".into()).key(), "app");
        assert_eq!(GroupBy::from_id("Project"), Some(GroupBy::Project));
    }

    #[test]
    fn empty_report_yields_no_items() {
        let items = compute_report_items(&Report::default(), &GroupBy::Date, SortDirection::Desc);
        assert!(items.is_empty());
    }
}
