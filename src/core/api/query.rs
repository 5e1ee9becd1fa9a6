use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::core::computed::{GroupBy, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Daily,
    Monthly,
}

impl Resolution {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeScopeUnits {
    Month,
    Day,
}

impl TimeScopeUnits {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Day => "day",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryFilter {
    pub time_scope_units: Option<TimeScopeUnits>,
    /// -1 is the current month, -2 the previous one.
    pub time_scope_value: Option<i32>,
    pub resolution: Option<Resolution>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportQuery {
    pub filter: QueryFilter,
    /// `group_by[key]=value` pairs, e.g. `project -> *`.
    pub group_by: BTreeMap<String, String>,
    pub order_by: BTreeMap<String, SortDirection>,
}

impl ReportQuery {
    /// The daily query for the current (`months_back == 0`) or an earlier month.
    pub fn month(months_back: u32, resolution: Resolution) -> Self {
        Self {
            filter: QueryFilter {
                time_scope_units: Some(TimeScopeUnits::Month),
                time_scope_value: Some(-1 - months_back as i32),
                resolution: Some(resolution),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn group_by(mut self, group: &GroupBy, value: &str) -> Self {
        self.group_by.insert(group.query_key(), value.to_string());
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.insert(field.to_string(), direction);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.filter.limit = Some(limit);
        self
    }

    pub fn service(mut self, service: &str) -> Self {
        self.filter.service = Some(service.to_string());
        self
    }
}

/// Percent-encode a parameter value. The `*` wildcard stays literal.
fn encode_value(value: &str) -> Cow<'_, str> {
    if value == "*" {
        Cow::Borrowed(value)
    } else {
        urlencoding::encode(value)
    }
}

/// Shape a query string: `filter[...]` first, then `group_by[...]`, then
/// `order_by[...]`. Brackets are not escaped; values are.
pub fn get_query(query: &ReportQuery) -> String {
    let mut parts: Vec<String> = Vec::new();
    let f = &query.filter;
    if let Some(units) = f.time_scope_units {
        parts.push(format!("filter[time_scope_units]={}", units.as_str()));
    }
    if let Some(value) = f.time_scope_value {
        parts.push(format!("filter[time_scope_value]={}", value));
    }
    if let Some(resolution) = f.resolution {
        parts.push(format!("filter[resolution]={}", resolution.as_str()));
    }
    if let Some(limit) = f.limit {
        parts.push(format!("filter[limit]={}", limit));
    }
    if let Some(offset) = f.offset {
        parts.push(format!("filter[offset]={}", offset));
    }
    if let Some(service) = &f.service {
        parts.push(format!("filter[service]={}", encode_value(service)));
    }
    for (key, value) in &query.group_by {
        parts.push(format!("group_by[{}]={}", key, encode_value(value)));
    }
    for (key, direction) in &query.order_by {
        let dir = match direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        parts.push(format!("order_by[{}]={}", key, dir));
    }
    parts.join("&")
}

/// Which grouped items an export covers.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportSelection {
    All,
    Items(Vec<String>),
}

/// Query string for a report export: grouping and ordering are dropped, the
/// resolution is replaced, and one `group_by` pair is appended per selected
/// item (ascending) or a single wildcard for all items.
pub fn export_query(
    query: &ReportQuery,
    resolution: Resolution,
    group_by: &GroupBy,
    selection: &ExportSelection,
) -> String {
    let mut base = query.clone();
    base.group_by.clear();
    base.order_by.clear();
    base.filter.resolution = Some(resolution);

    let mut query_string = get_query(&base);
    let key = group_by.query_key();
    let mut push = |value: &str| {
        if !query_string.is_empty() {
            query_string.push('&');
        }
        query_string.push_str(&format!("group_by[{}]={}", key, encode_value(value)));
    };
    match selection {
        ExportSelection::All => push("*"),
        ExportSelection::Items(labels) => {
            let mut sorted = labels.clone();
            sorted.sort();
            for label in &sorted {
                push(label);
            }
        }
    }
    query_string
}

/// Query string for the cost model list (`name=...&limit=...`).
pub fn cost_models_query(
    filter_type: &str,
    filter_value: &str,
    limit: Option<u32>,
    offset: Option<u32>,
) -> String {
    let mut parts = Vec::new();
    if !filter_value.is_empty() {
        parts.push(format!("{}={}", filter_type, encode_value(filter_value)));
    }
    if let Some(limit) = limit {
        parts.push(format!("limit={}", limit));
    }
    if let Some(offset) = offset {
        parts.push(format!("offset={}", offset));
    }
    parts.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_query_current_and_previous() {
        assert_eq!(
            get_query(&ReportQuery::month(0, Resolution::Daily)),
            "filter[time_scope_units]=month&filter[time_scope_value]=-1&filter[resolution]=daily"
        );
        assert_eq!(
            get_query(&ReportQuery::month(1, Resolution::Monthly)),
            "filter[time_scope_units]=month&filter[time_scope_value]=-2&filter[resolution]=monthly"
        );
    }

    #[test]
    fn query_includes_group_and_order() {
        let q = ReportQuery::month(0, Resolution::Monthly)
            .group_by(&GroupBy::Project, "*")
            .order_by("cost", SortDirection::Desc)
            .limit(5);
        assert_eq!(
            get_query(&q),
            "filter[time_scope_units]=month&filter[time_scope_value]=-1&filter[resolution]=monthly\
             &filter[limit]=5&group_by[project]=*&order_by[cost]=desc"
        );
    }

    #[test]
    fn empty_query_is_empty_string() {
        assert_eq!(get_query(&ReportQuery::default()), "");
    }

    #[test]
    fn export_query_replaces_grouping_with_items() {
        let q = ReportQuery::month(0, Resolution::Monthly)
            .group_by(&GroupBy::Project, "*")
            .order_by("cost", SortDirection::Desc);
        let s = export_query(
            &q,
            Resolution::Daily,
            &GroupBy::Project,
            &ExportSelection::Items(vec!["web".to_string(), "api".to_string()]),
        );
        assert_eq!(
            s,
            "filter[time_scope_units]=month&filter[time_scope_value]=-1&filter[resolution]=daily\
             &group_by[project]=api&group_by[project]=web"
        );
    }

    #[test]
    fn export_query_all_items_uses_wildcard() {
        let s = export_query(
            &ReportQuery::default(),
            Resolution::Monthly,
            &GroupBy::Tag("app".into()),
            &ExportSelection::All,
        );
        assert_eq!(s, "filter[resolution]=monthly&group_by[tag:app]=*");
    }

    #[test]
    fn export_query_encodes_item_labels() {
        let s = export_query(
            &ReportQuery::default(),
            Resolution::Monthly,
            &GroupBy::Project,
            &ExportSelection::Items(vec!["R&D #2".to_string()]),
        );
        assert_eq!(s, "filter[resolution]=monthly&group_by[project]=R%26D%20%232");
    }

    #[test]
    fn service_filter_value_is_encoded() {
        let q = ReportQuery::default().service("Amazon S3&Glacier");
        assert_eq!(get_query(&q), "filter[service]=Amazon%20S3%26Glacier");
    }

    #[test]
    fn cost_models_query_skips_empty_filter() {
        assert_eq!(cost_models_query("name", "", Some(10), Some(0)), "limit=10&offset=0");
        assert_eq!(cost_models_query("source_type", "OCP", None, None), "source_type=OCP");
    }

    #[test]
    fn resolution_parses() {
        assert_eq!(Resolution::from_id("Daily"), Some(Resolution::Daily));
        assert_eq!(Resolution::from_id("weekly"), None);
    }
}
