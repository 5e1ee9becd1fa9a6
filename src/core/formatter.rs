use chrono::NaiveDate;

use crate::core::chart::ChartDatum;
use crate::core::computed::GroupBy;
use crate::core::i18n::{MessageParams, Translator};

/// Units whose tooltip wraps the value in a `unit_tooltips.*` message.
const TOOLTIP_UNITS: &[&str] = &["core-hours", "hrs", "gb", "gb-hours", "gb-mo", "vm-hours"];

/// Normalise an API unit string ("GB-Mo", "Core-Hours") to a lookup key.
pub fn unit_lookup_key(units: Option<&str>) -> Option<String> {
    let units = units?.trim();
    if units.is_empty() {
        return None;
    }
    Some(units.to_lowercase())
}

fn is_currency(key: &str) -> bool {
    matches!(key, "usd" | "eur" | "gbp" | "jpy" | "cad" | "aud")
}

fn currency_symbol(key: &str) -> &'static str {
    match key {
        "eur" => "€",
        "gbp" => "£",
        "jpy" => "¥",
        _ => "$",
    }
}

/// Returns "1,234.57": two decimals with thousands separators.
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Format a chart value with its units. Currency units get a symbol
/// prefix, other units are appended. `None` renders as "no data".
pub fn format_value(value: Option<f64>, units: Option<&str>) -> String {
    let Some(value) = value else {
        return "no data".to_string();
    };
    match unit_lookup_key(units) {
        Some(key) if is_currency(&key) => {
            let number = format_number(value);
            match number.strip_prefix('-') {
                Some(abs) => format!("-{}{}", currency_symbol(&key), abs),
                None => format!("{}{}", currency_symbol(&key), number),
            }
        }
        Some(_) => format!("{} {}", format_number(value), units.unwrap_or_default().trim()),
        None => format_number(value),
    }
}

/// A `[████░░░░]` bar filled in proportion to `value / max`.
pub fn format_value_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let filled_blocks = (ratio * width as f64).round() as usize;
    let empty_blocks = width.saturating_sub(filled_blocks);
    format!("[{}{}]", "█".repeat(filled_blocks), "░".repeat(empty_blocks))
}

/// Tooltip text for a value; known usage units are wrapped in their message.
pub fn get_tooltip_content(t: &dyn Translator, value: Option<f64>, units: Option<&str>) -> String {
    let Some(value) = value else {
        return t.translate("chart.no_data", &MessageParams::new());
    };
    match unit_lookup_key(units) {
        Some(key) if TOOLTIP_UNITS.contains(&key.as_str()) => t.translate(
            &format!("unit_tooltips.{}", key),
            &MessageParams::new().with("value", format_number(value)),
        ),
        _ => format_value(Some(value), units),
    }
}

/// "DD Mon YYYY <value>" for date series, the key for label series, and an
/// empty string for a datum without a key.
pub fn get_tooltip_label(datum: &ChartDatum, group_by: &GroupBy, units: Option<&str>) -> String {
    if datum.key.is_empty() {
        return String::new();
    }
    if group_by.is_date() {
        let units = units.or(datum.units.as_deref());
        let date = datum
            .date()
            .map(|d: NaiveDate| d.format("%d %b %Y").to_string())
            .unwrap_or_else(|| datum.key.clone());
        return format!("{} {}", date, format_value(datum.y, units));
    }
    datum.key.clone()
}
