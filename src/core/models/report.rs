use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{lenient_f64, lenient_opt, lenient_vec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ocp,
    Aws,
    Azure,
    OcpCloud,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[Self::Ocp, Self::Aws, Self::Azure, Self::OcpCloud]
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "ocp" | "openshift" => Some(Self::Ocp),
            "aws" => Some(Self::Aws),
            "azure" => Some(Self::Azure),
            "ocp_cloud" | "ocp-cloud" | "ocpcloud" => Some(Self::OcpCloud),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Ocp => "ocp",
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::OcpCloud => "ocp_cloud",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ocp => "OpenShift",
            Self::Aws => "Amazon Web Services",
            Self::Azure => "Microsoft Azure",
            Self::OcpCloud => "OpenShift on cloud",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Cost,
    Cpu,
    Memory,
    Volume,
    Database,
    Network,
    Storage,
    Instance,
    Tag,
}

impl ReportKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "cost" | "costs" => Some(Self::Cost),
            "cpu" | "compute" => Some(Self::Cpu),
            "memory" => Some(Self::Memory),
            "volume" | "volumes" => Some(Self::Volume),
            "database" => Some(Self::Database),
            "network" => Some(Self::Network),
            "storage" => Some(Self::Storage),
            "instance" | "instance_type" | "instance-types" => Some(Self::Instance),
            "tag" | "tags" => Some(Self::Tag),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Volume => "volume",
            Self::Database => "database",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Instance => "instance",
            Self::Tag => "tag",
        }
    }

    /// Tag endpoints return key listings rather than dated cost rows.
    pub fn is_chartable(&self) -> bool {
        !matches!(self, Self::Tag)
    }
}

/// A `{value, units}` pair as returned by the reporting API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportAmount {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
}

/// Cost-like metric groups split into raw/markup/usage/total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBreakdown {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub raw: Option<ReportAmount>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub markup: Option<ReportAmount>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub usage: Option<ReportAmount>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub total: Option<ReportAmount>,
}

/// One value row inside a report date. Group labels (`project`, `cluster`,
/// `account`, tag keys, ...) are kept in `labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportValue {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub cost: Option<MetricBreakdown>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub infrastructure: Option<MetricBreakdown>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub supplementary: Option<MetricBreakdown>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub usage: Option<ReportAmount>,
    #[serde(flatten)]
    pub labels: BTreeMap<String, serde_json::Value>,
}

impl ReportValue {
    /// The group label stored under `key`, if it is a string or number.
    pub fn label(&self, key: &str) -> Option<String> {
        match self.labels.get(key)? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One entry of `data`: a date plus its values, either directly under
/// `values` or nested inside group arrays (`projects: [{project, values}]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDate {
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub values: Vec<ReportValue>,
    #[serde(flatten)]
    pub groups: BTreeMap<String, serde_json::Value>,
}

impl ReportDate {
    /// All value rows for this date, flattening nested group arrays.
    /// Rows that fail to parse are skipped.
    pub fn all_values(&self) -> Vec<ReportValue> {
        let mut out = self.values.clone();
        for nested in self.groups.values() {
            collect_nested_values(nested, &mut out);
        }
        out
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_report_date(&self.date)
    }
}

fn collect_nested_values(node: &serde_json::Value, out: &mut Vec<ReportValue>) {
    let serde_json::Value::Array(entries) = node else {
        return;
    };
    for entry in entries {
        let serde_json::Value::Object(map) = entry else {
            continue;
        };
        for (key, child) in map {
            if key == "values" {
                if let serde_json::Value::Array(rows) = child {
                    out.extend(
                        rows.iter()
                            .filter_map(|row| serde_json::from_value::<ReportValue>(row.clone()).ok()),
                    );
                }
            } else {
                collect_nested_values(child, out);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub cost: Option<MetricBreakdown>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub infrastructure: Option<MetricBreakdown>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub supplementary: Option<MetricBreakdown>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub usage: Option<ReportAmount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub total: Option<ReportTotals>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub meta: Option<ReportMeta>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub data: Vec<ReportDate>,
}

impl Report {
    /// Drop date entries whose `date` is not a `YYYY-MM-DD` (or `YYYY-MM`)
    /// calendar date, so the chart pipeline only ever sees valid keys.
    pub fn sanitize(mut self) -> Self {
        let before = self.data.len();
        self.data.retain(|d| d.parsed_date().is_some());
        let dropped = before - self.data.len();
        if dropped > 0 {
            tracing::debug!("Dropped {} report entries with invalid dates", dropped);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parse a report date key. Monthly resolution keys (`2023-04`) resolve to
/// the first of the month.
pub fn parse_report_date(key: &str) -> Option<NaiveDate> {
    parse_day_key(key).or_else(|| {
        NaiveDate::parse_from_str(&format!("{}-01", key.trim()), "%Y-%m-%d").ok()
    })
}

/// Parse a daily `YYYY-MM-DD` key only.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY_REPORT: &str = r#"{
        "meta": { "count": 2, "total": { "cost": { "total": { "value": 30.5, "units": "USD" } } } },
        "data": [
            {
                "date": "2023-04-01",
                "values": [
                    {
                        "date": "2023-04-01",
                        "cost": {
                            "raw": { "value": 10.0, "units": "USD" },
                            "markup": { "value": 1.0, "units": "USD" },
                            "usage": { "value": 0, "units": "USD" },
                            "total": { "value": 11.0, "units": "USD" }
                        },
                        "usage": { "value": "42.5", "units": "Core-Hours" }
                    }
                ]
            },
            {
                "date": "2023-04-02",
                "projects": [
                    { "project": "web", "values": [ { "date": "2023-04-02", "project": "web", "cost": { "total": { "value": 19.5, "units": "USD" } } } ] },
                    { "project": "db", "values": [ { "date": "2023-04-02", "project": "db", "cost": { "total": { "value": "bogus", "units": "USD" } } } ] }
                ]
            }
        ]
    }"#;

    #[test]
    fn deserialize_daily_report() {
        let report: Report = serde_json::from_str(DAILY_REPORT).unwrap();
        assert_eq!(report.data.len(), 2);
        assert_eq!(report.meta.as_ref().unwrap().count, Some(2));
        let first = &report.data[0].values[0];
        let cost = first.cost.as_ref().unwrap();
        assert_eq!(cost.total.as_ref().unwrap().value, Some(11.0));
        assert_eq!(first.usage.as_ref().unwrap().value, Some(42.5));
        assert_eq!(first.usage.as_ref().unwrap().units.as_deref(), Some("Core-Hours"));
    }

    #[test]
    fn nested_group_values_are_flattened() {
        let report: Report = serde_json::from_str(DAILY_REPORT).unwrap();
        let values = report.data[1].all_values();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].label("project").as_deref(), Some("web"));
        assert_eq!(values[1].label("project").as_deref(), Some("db"));
    }

    #[test]
    fn non_numeric_value_becomes_none() {
        let report: Report = serde_json::from_str(DAILY_REPORT).unwrap();
        let values = report.data[1].all_values();
        let total = values[1].cost.as_ref().unwrap().total.as_ref().unwrap();
        assert_eq!(total.value, None);
    }

    #[test]
    fn empty_object_is_an_empty_report() {
        let report: Report = serde_json::from_str("{}").unwrap();
        assert!(report.is_empty());
        assert!(report.meta.is_none());
    }

    #[test]
    fn sanitize_drops_invalid_dates() {
        let json = r#"{ "data": [
            { "date": "2023-04-01", "values": [] },
            { "date": "not-a-date", "values": [] },
            { "date": "2023-02-30", "values": [] },
            { "date": "2023-05", "values": [] }
        ] }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        let clean = report.sanitize();
        let dates: Vec<&str> = clean.data.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2023-04-01", "2023-05"]);
    }

    #[test]
    fn parse_report_date_monthly_key() {
        assert_eq!(
            parse_report_date("2023-05"),
            NaiveDate::from_ymd_opt(2023, 5, 1)
        );
        assert_eq!(parse_report_date("garbage"), None);
    }

    #[test]
    fn parse_day_key_rejects_monthly_keys() {
        assert_eq!(parse_day_key("2023-05"), None);
        assert_eq!(parse_day_key("2023-05-07"), NaiveDate::from_ymd_opt(2023, 5, 7));
    }

    #[test]
    fn entry_without_date_is_dropped_not_fatal() {
        let json = r#"{ "data": [
            { "values": [ { "cost": { "total": { "value": 1 } } } ] },
            { "date": "2023-04-02", "values": [ { "cost": { "total": { "value": 2 } } } ] }
        ] }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.data.len(), 2);
        let clean = report.sanitize();
        assert_eq!(clean.data.len(), 1);
        assert_eq!(clean.data[0].date, "2023-04-02");
    }

    #[test]
    fn malformed_metric_group_degrades_to_none() {
        let json = r#"{ "data": [ { "date": "2023-04-01", "values": [
            { "cost": "n/a", "usage": { "value": 3, "units": "GB-Mo" } }
        ] } ] }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        let value = &report.data[0].values[0];
        assert_eq!(value.cost, None);
        assert_eq!(value.usage.as_ref().unwrap().value, Some(3.0));
    }

    #[test]
    fn non_object_rows_are_skipped() {
        let json = r#"{ "meta": "broken", "data": [ "app", "env", { "date": "2023-04-01", "values": [ 7, {} ] } ] }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert!(report.meta.is_none());
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].values.len(), 1);
    }

    #[test]
    fn tag_reports_are_not_chartable() {
        assert!(!ReportKind::Tag.is_chartable());
        assert!(ReportKind::Cost.is_chartable());
    }

    #[test]
    fn platform_and_kind_ids_roundtrip() {
        for p in Platform::all() {
            assert_eq!(Platform::from_id(p.id()), Some(*p));
        }
        assert_eq!(ReportKind::from_id("compute"), Some(ReportKind::Cpu));
        assert_eq!(ReportKind::from_id("instance-types"), Some(ReportKind::Instance));
        assert_eq!(ReportKind::from_id("nope"), None);
    }

    #[test]
    fn label_ignores_empty_and_non_scalar() {
        let value: ReportValue = serde_json::from_str(
            r#"{ "project": "", "cluster": 7, "node": { "a": 1 } }"#,
        )
        .unwrap();
        assert_eq!(value.label("project"), None);
        assert_eq!(value.label("cluster").as_deref(), Some("7"));
        assert_eq!(value.label("node"), None);
        assert_eq!(value.label("missing"), None);
    }
}
