use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::lenient_f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CostType {
    #[default]
    Infrastructure,
    Supplementary,
}

impl CostType {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "infrastructure" => Some(Self::Infrastructure),
            "supplementary" => Some(Self::Supplementary),
            _ => None,
        }
    }
}

impl std::fmt::Display for CostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "Infrastructure"),
            Self::Supplementary => write!(f, "Supplementary"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    #[default]
    Regular,
    Tagging,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateMetric {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_measurement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_measurement_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredRate {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default = "default_currency")]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagValue {
    pub tag_value: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default = "default_currency")]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRates {
    pub tag_key: String,
    #[serde(default)]
    pub tag_values: Vec<TagValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub metric: RateMetric,
    #[serde(default)]
    pub cost_type: CostType,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiered_rates: Vec<TieredRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_rates: Option<TagRates>,
}

impl Rate {
    pub fn kind(&self) -> RateKind {
        if self.tag_rates.is_some() {
            RateKind::Tagging
        } else {
            RateKind::Regular
        }
    }

    /// True when both rates price the same metric/measurement for the same cost type.
    pub fn conflicts_with(&self, other: &Rate) -> bool {
        self.cost_type == other.cost_type
            && self.metric.label_metric == other.metric.label_metric
            && self.metric.label_measurement == other.metric.label_measurement
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markup {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default = "default_markup_unit")]
    pub unit: String,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            value: Some(0.0),
            unit: default_markup_unit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModelSource {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub markup: Markup,
    #[serde(default)]
    pub rates: Vec<Rate>,
    #[serde(default)]
    pub sources: Vec<CostModelSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostModels {
    #[serde(default)]
    pub meta: PageMeta,
    #[serde(default)]
    pub data: Vec<CostModel>,
}

/// One entry of the metrics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    #[serde(default)]
    pub source_type: String,
    pub metric: String,
    pub label_metric: String,
    pub label_measurement: String,
    #[serde(default)]
    pub label_measurement_unit: String,
    #[serde(default)]
    pub default_cost_type: Option<CostType>,
}

/// metric label -> measurement label -> definition
pub type MetricHash = BTreeMap<String, BTreeMap<String, MetricDefinition>>;

pub fn metric_hash(definitions: Vec<MetricDefinition>) -> MetricHash {
    let mut hash = MetricHash::new();
    for def in definitions {
        hash.entry(def.label_metric.clone())
            .or_default()
            .insert(def.label_measurement.clone(), def);
    }
    hash
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_markup_unit() -> String {
    "percent".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(metric: &str, measurement: &str) -> MetricDefinition {
        MetricDefinition {
            source_type: "OCP".to_string(),
            metric: format!("{}_{}", metric, measurement).to_lowercase(),
            label_metric: metric.to_string(),
            label_measurement: measurement.to_string(),
            label_measurement_unit: "core-hours".to_string(),
            default_cost_type: Some(CostType::Supplementary),
        }
    }

    #[test]
    fn deserialize_cost_model_with_both_rate_kinds() {
        let json = r#"{
            "uuid": "abc",
            "name": "Default",
            "source_type": "OCP",
            "markup": { "value": "10.0000000", "unit": "percent" },
            "rates": [
                {
                    "metric": { "name": "cpu_core_usage_per_hour", "label_metric": "CPU", "label_measurement": "Usage" },
                    "cost_type": "Infrastructure",
                    "tiered_rates": [ { "value": 0.2, "unit": "USD" } ]
                },
                {
                    "metric": { "name": "node_cost_per_month", "label_metric": "Node", "label_measurement": "Currently" },
                    "cost_type": "Supplementary",
                    "tag_rates": { "tag_key": "app", "tag_values": [ { "tag_value": "web", "value": 3, "default": true } ] }
                }
            ],
            "sources": [ { "uuid": "src-1", "name": "cluster-a" } ],
            "updated_timestamp": "2023-04-05T10:00:00Z"
        }"#;
        let model: CostModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.markup.value, Some(10.0));
        assert_eq!(model.rates.len(), 2);
        assert_eq!(model.rates[0].kind(), RateKind::Regular);
        assert_eq!(model.rates[1].kind(), RateKind::Tagging);
        assert_eq!(model.rates[1].cost_type, CostType::Supplementary);
        assert!(model.updated_timestamp.is_some());
    }

    #[test]
    fn markup_defaults_to_zero_percent() {
        let model: CostModel = serde_json::from_str(r#"{ "name": "m" }"#).unwrap();
        assert_eq!(model.markup.value, Some(0.0));
        assert_eq!(model.markup.unit, "percent");
    }

    #[test]
    fn regular_rate_serializes_without_tag_rates() {
        let rate = Rate {
            metric: RateMetric {
                name: "cpu".to_string(),
                ..Default::default()
            },
            cost_type: CostType::Infrastructure,
            description: String::new(),
            tiered_rates: vec![TieredRate {
                value: Some(1.5),
                unit: "USD".to_string(),
            }],
            tag_rates: None,
        };
        let json = serde_json::to_value(&rate).unwrap();
        assert!(json.get("tag_rates").is_none());
        assert_eq!(json["tiered_rates"][0]["value"], 1.5);
    }

    #[test]
    fn metric_hash_groups_by_metric_then_measurement() {
        let hash = metric_hash(vec![
            definition("CPU", "Usage"),
            definition("CPU", "Request"),
            definition("Memory", "Usage"),
        ]);
        assert_eq!(hash.len(), 2);
        let cpu = hash.get("CPU").unwrap();
        assert!(cpu.contains_key("Usage"));
        assert!(cpu.contains_key("Request"));
    }

    #[test]
    fn conflicts_require_same_cost_type() {
        let mut a = Rate {
            metric: RateMetric {
                name: "cpu".into(),
                label_metric: Some("CPU".into()),
                label_measurement: Some("Usage".into()),
                label_measurement_unit: None,
            },
            cost_type: CostType::Infrastructure,
            description: String::new(),
            tiered_rates: vec![],
            tag_rates: None,
        };
        let b = a.clone();
        assert!(a.conflicts_with(&b));
        a.cost_type = CostType::Supplementary;
        assert!(!a.conflicts_with(&b));
    }

    #[test]
    fn cost_type_parses_case_insensitively() {
        assert_eq!(CostType::from_id("infrastructure"), Some(CostType::Infrastructure));
        assert_eq!(CostType::from_id("Supplementary"), Some(CostType::Supplementary));
        assert_eq!(CostType::from_id("other"), None);
    }
}
