use colored::{control, Colorize};

use crate::core::chart::trend::{ChartDomain, TrendSeries};
use crate::core::chart::{ChartDatum, ChartX};
use crate::core::computed::GroupBy;
use crate::core::formatter::{format_value, format_value_bar, get_tooltip_content};
use crate::core::i18n::Translator;
use crate::core::models::cost_model::{CostModels, MetricHash, RateKind};

const BAR_WIDTH: usize = 20;
const LABEL_WIDTH: usize = 24;

fn row_label(datum: &ChartDatum) -> String {
    match (&datum.x, datum.date()) {
        (ChartX::Day(_), Some(date)) => date.format("%d %b").to_string(),
        (ChartX::Day(day), None) => format!("{:02}", day),
        (ChartX::Label(label), _) => {
            if label.chars().count() > LABEL_WIDTH {
                let truncated: String = label.chars().take(LABEL_WIDTH - 1).collect();
                format!("{}…", truncated)
            } else {
                label.clone()
            }
        }
    }
}

/// Render chart series as one row per datum.
///
/// ```text
///  Cost (OpenShift)
///  Apr 1-30 cost
///   01 Apr                   [████░░░░░░░░░░░░░░░░] $12.00
///   02 Apr                   no data
/// ```
pub fn render_chart(
    title: &str,
    series: &[TrendSeries],
    group_by: &GroupBy,
    domain: &ChartDomain,
    t: &dyn Translator,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" {}", title).bold().to_string());

    let max = domain.y.map(|(_, max)| max).unwrap_or(0.0);
    for (i, s) in series.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!(" {}", s.legend.cyan()));
        if s.data.is_empty() {
            let empty = t.translate("chart.no_data", &Default::default());
            lines.push(format!("  {}", empty.dimmed()));
            continue;
        }
        for datum in &s.data {
            let label = format!("{:<width$}", row_label(datum), width = LABEL_WIDTH);
            let line = match datum.y {
                Some(y) => format!(
                    "  {} {} {}",
                    label,
                    format_value_bar(y, max, BAR_WIDTH).magenta(),
                    get_tooltip_content(t, Some(y), datum.units.as_deref())
                ),
                None => format!(
                    "  {} {}",
                    label,
                    get_tooltip_content(t, None, None).dimmed()
                ),
            };
            lines.push(line);
        }
    }

    if group_by.is_date() {
        if let Some((_, y_max)) = domain.y {
            lines.push(format!(
                "  {} 0 - {}",
                "Domain".cyan(),
                format_value(Some(y_max), None)
            ));
        }
    }

    lines.join("\n")
}

pub fn render_cost_models(models: &CostModels, can_write: Option<bool>, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" Cost models ({})", models.meta.count).bold().to_string());
    if models.data.is_empty() {
        lines.push(format!("  {}", "No cost models".dimmed()));
    }
    for model in &models.data {
        lines.push(String::new());
        lines.push(format!("  {}", model.name.bold()));
        if let Some(uuid) = &model.uuid {
            lines.push(format!("  {}      {}", "UUID".cyan(), uuid.dimmed()));
        }
        if !model.description.is_empty() {
            lines.push(format!("  {}      {}", "Info".cyan(), model.description));
        }
        lines.push(format!("  {}    {}", "Source".cyan(), model.source_type));
        let markup = match model.markup.value {
            Some(v) => format!("{}%", crate::core::formatter::format_number(v)),
            None => "-".to_string(),
        };
        lines.push(format!("  {}    {}", "Markup".cyan(), markup));
        let tagging = model.rates.iter().filter(|r| r.kind() == RateKind::Tagging).count();
        lines.push(format!(
            "  {}     {} ({} tag-based)",
            "Rates".cyan(),
            model.rates.len(),
            tagging
        ));
        if !model.sources.is_empty() {
            let names: Vec<&str> = model.sources.iter().map(|s| s.name.as_str()).collect();
            lines.push(format!("  {}   {}", "Sources".cyan(), names.join(", ")));
        }
        if let Some(updated) = &model.updated_timestamp {
            lines.push(format!(
                "  {}   {}",
                "Updated".cyan(),
                updated.format("%Y-%m-%d %H:%M")
            ));
        }
    }
    if can_write == Some(false) {
        lines.push(String::new());
        lines.push(format!("  {}", "Read-only: no permission to edit cost models".yellow()));
    }
    lines.join("\n")
}

pub fn render_metrics(metrics: &MetricHash, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = vec![" Metrics".bold().to_string()];
    for (metric, measurements) in metrics {
        lines.push(format!("  {}", metric.cyan()));
        for (measurement, def) in measurements {
            let cost_type = def
                .default_cost_type
                .map(|c| format!(" ({})", c))
                .unwrap_or_default();
            lines.push(format!(
                "    {:<12} {}{}",
                measurement,
                def.label_measurement_unit.dimmed(),
                cost_type
            ));
        }
    }
    lines.join("\n")
}
