use std::collections::HashSet;

use super::error_keys::*;
use crate::core::models::cost_model::{
    CostType, MetricHash, Rate, RateKind, RateMetric, TagRates, TagValue, TieredRate,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStep {
    #[default]
    Initial,
    SetMetric,
    SetRate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagValueRow {
    pub tag_value: String,
    pub value: String,
    pub description: String,
    pub is_default: bool,
}

/// Editable state of the add/edit rate form. Numeric fields hold raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateForm {
    pub step: FormStep,
    pub description: String,
    pub metric: String,
    pub measurement: String,
    pub calculation: CostType,
    pub rate_kind: RateKind,
    pub regular_rate: String,
    pub tag_key: String,
    pub tag_values: Vec<TagValueRow>,
}

/// Field errors as catalog keys. Row errors line up with `RateForm::tag_values`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateFormErrors {
    pub measurement: Option<&'static str>,
    pub duplicate: Option<&'static str>,
    pub rate: Option<&'static str>,
    pub tag_key: Option<&'static str>,
    pub tag_values: Vec<Option<&'static str>>,
    pub tag_rates: Vec<Option<&'static str>>,
}

impl RateFormErrors {
    pub fn is_empty(&self) -> bool {
        self.measurement.is_none()
            && self.duplicate.is_none()
            && self.rate.is_none()
            && self.tag_key.is_none()
            && self.tag_values.iter().all(Option::is_none)
            && self.tag_rates.iter().all(Option::is_none)
    }

    /// All error keys, deduplicated, in field order.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        let all = [self.measurement, self.duplicate, self.rate, self.tag_key]
            .into_iter()
            .chain(self.tag_values.iter().copied())
            .chain(self.tag_rates.iter().copied())
            .flatten();
        for key in all {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

fn validate_rate_text(text: &str) -> Option<&'static str> {
    let text = text.trim();
    if text.is_empty() {
        return Some(REQUIRED);
    }
    match text.parse::<f64>() {
        Ok(v) if !v.is_finite() => Some(RATE_NOT_NUMBER),
        Ok(v) if v < 0.0 => Some(RATE_NEGATIVE),
        Ok(_) => None,
        Err(_) => Some(RATE_NOT_NUMBER),
    }
}

impl RateForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picking a metric invalidates any previously chosen measurement.
    pub fn set_metric(&mut self, metric: &str) {
        self.metric = metric.to_string();
        self.measurement.clear();
        self.step = FormStep::SetMetric;
    }

    /// Picks the measurement and applies the metric's default cost type.
    pub fn set_measurement(&mut self, measurement: &str, metrics: &MetricHash) {
        self.measurement = measurement.to_string();
        if let Some(cost_type) = metrics
            .get(&self.metric)
            .and_then(|m| m.get(measurement))
            .and_then(|d| d.default_cost_type)
        {
            self.calculation = cost_type;
        }
        self.step = FormStep::SetRate;
    }

    pub fn add_tag_value(&mut self, row: TagValueRow) {
        if row.is_default {
            for existing in &mut self.tag_values {
                existing.is_default = false;
            }
        }
        self.tag_values.push(row);
    }

    pub fn remove_tag_value(&mut self, index: usize) {
        if index < self.tag_values.len() {
            self.tag_values.remove(index);
        }
    }

    pub fn validate(&self, existing_rates: &[Rate]) -> RateFormErrors {
        let mut errors = RateFormErrors::default();

        if self.measurement.trim().is_empty() {
            errors.measurement = Some(MEASUREMENT_REQUIRED);
        } else if existing_rates.iter().any(|r| {
            r.cost_type == self.calculation
                && r.metric.label_metric.as_deref() == Some(self.metric.as_str())
                && r.metric.label_measurement.as_deref() == Some(self.measurement.as_str())
        }) {
            errors.duplicate = Some(DUPLICATE);
        }

        match self.rate_kind {
            RateKind::Regular => errors.rate = validate_rate_text(&self.regular_rate),
            RateKind::Tagging => {
                if self.tag_key.trim().is_empty() {
                    errors.tag_key = Some(TAG_KEY_REQUIRED);
                }
                let mut seen = HashSet::new();
                for row in &self.tag_values {
                    let name = row.tag_value.trim();
                    let value_error = if name.is_empty() {
                        Some(TAG_VALUE_REQUIRED)
                    } else if !seen.insert(name) {
                        Some(TAG_VALUE_DUPLICATE)
                    } else {
                        None
                    };
                    errors.tag_values.push(value_error);
                    errors.tag_rates.push(validate_rate_text(&row.value));
                }
            }
        }
        errors
    }

    /// Builds the rate when the form is valid.
    pub fn to_rate(&self, metrics: &MetricHash, existing_rates: &[Rate]) -> Result<Rate, RateFormErrors> {
        let mut errors = self.validate(existing_rates);
        let definition = metrics
            .get(&self.metric)
            .and_then(|m| m.get(&self.measurement));
        if definition.is_none() && errors.measurement.is_none() {
            errors.measurement = Some(MEASUREMENT_REQUIRED);
        }
        let (Some(definition), true) = (definition, errors.is_empty()) else {
            return Err(errors);
        };

        let metric = RateMetric {
            name: definition.metric.clone(),
            label_metric: Some(definition.label_metric.clone()),
            label_measurement: Some(definition.label_measurement.clone()),
            label_measurement_unit: Some(definition.label_measurement_unit.clone()),
        };
        // Values were validated above.
        let parse = |text: &str| text.trim().parse::<f64>().ok();
        let rate = match self.rate_kind {
            RateKind::Regular => Rate {
                metric,
                cost_type: self.calculation,
                description: self.description.clone(),
                tiered_rates: vec![TieredRate {
                    value: parse(&self.regular_rate),
                    unit: "USD".to_string(),
                }],
                tag_rates: None,
            },
            RateKind::Tagging => Rate {
                metric,
                cost_type: self.calculation,
                description: self.description.clone(),
                tiered_rates: Vec::new(),
                tag_rates: Some(TagRates {
                    tag_key: self.tag_key.trim().to_string(),
                    tag_values: self
                        .tag_values
                        .iter()
                        .map(|row| TagValue {
                            tag_value: row.tag_value.trim().to_string(),
                            value: parse(&row.value),
                            unit: "USD".to_string(),
                            description: row.description.clone(),
                            default: row.is_default,
                        })
                        .collect(),
                }),
            },
        };
        Ok(rate)
    }
}
