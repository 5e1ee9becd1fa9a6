use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::Action;
use crate::core::chart::ChartKind;
use crate::core::computed::{GroupBy, ReportItem};
use crate::core::models::report::ReportKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    Projects,
    Clusters,
    Services,
    Accounts,
    Regions,
}

impl DashboardTab {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "projects" | "project" => Some(Self::Projects),
            "clusters" | "cluster" => Some(Self::Clusters),
            "services" | "service" => Some(Self::Services),
            "accounts" | "account" => Some(Self::Accounts),
            "regions" | "region" => Some(Self::Regions),
            _ => None,
        }
    }

    /// The grouping used to fetch a tab's top items.
    pub fn group_by(&self) -> GroupBy {
        match self {
            Self::Projects => GroupBy::Project,
            Self::Clusters => GroupBy::Cluster,
            Self::Services => GroupBy::Service,
            Self::Accounts => GroupBy::Account,
            Self::Regions => GroupBy::Region,
        }
    }

    pub fn title_key(&self) -> &'static str {
        match self {
            Self::Projects => "dashboard.tabs.projects",
            Self::Clusters => "dashboard.tabs.clusters",
            Self::Services => "dashboard.tabs.services",
            Self::Accounts => "dashboard.tabs.accounts",
            Self::Regions => "dashboard.tabs.regions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardWidget {
    pub id: u32,
    pub title_key: String,
    pub report_kind: ReportKind,
    /// Restricts cost reports to one service (database, network widgets).
    pub service_filter: Option<String>,
    pub chart_kind: ChartKind,
    pub report_item: ReportItem,
    pub available_tabs: Vec<DashboardTab>,
    pub current_tab: DashboardTab,
}

fn widget(
    id: u32,
    title_key: &str,
    report_kind: ReportKind,
    service_filter: Option<&str>,
    chart_kind: ChartKind,
    report_item: ReportItem,
    available_tabs: &[DashboardTab],
) -> DashboardWidget {
    DashboardWidget {
        id,
        title_key: title_key.to_string(),
        report_kind,
        service_filter: service_filter.map(str::to_string),
        chart_kind,
        report_item,
        available_tabs: available_tabs.to_vec(),
        current_tab: available_tabs[0],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    SetWidgetTab { id: u32, tab: DashboardTab },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub widgets: BTreeMap<u32, DashboardWidget>,
    /// Display order.
    pub current_widgets: Vec<u32>,
}

impl Default for DashboardState {
    fn default() -> Self {
        use DashboardTab::*;
        let widgets = vec![
            widget(0, "dashboard.cost_summary", ReportKind::Cost, None, ChartKind::Rolling, ReportItem::Cost, &[Projects, Clusters, Services, Accounts, Regions]),
            widget(1, "dashboard.compute", ReportKind::Instance, None, ChartKind::Daily, ReportItem::Usage, &[Services, Accounts, Regions]),
            widget(2, "dashboard.storage", ReportKind::Storage, None, ChartKind::Daily, ReportItem::Usage, &[Services, Accounts, Regions]),
            widget(3, "dashboard.network", ReportKind::Network, Some("AmazonVPC"), ChartKind::Rolling, ReportItem::Cost, &[Services, Accounts, Regions]),
            widget(4, "dashboard.database", ReportKind::Database, Some("AmazonRDS"), ChartKind::Rolling, ReportItem::Cost, &[Services, Accounts, Regions]),
        ];
        Self {
            current_widgets: vec![0, 1, 2, 3, 4],
            widgets: widgets.into_iter().map(|w| (w.id, w)).collect(),
        }
    }
}

impl DashboardState {
    pub fn widget(&self, id: u32) -> Option<&DashboardWidget> {
        self.widgets.get(&id)
    }

    /// Widgets in display order.
    pub fn ordered(&self) -> Vec<&DashboardWidget> {
        self.current_widgets
            .iter()
            .filter_map(|id| self.widgets.get(id))
            .collect()
    }
}

/// Unknown widget ids leave the state untouched.
pub fn reducer(state: &Arc<DashboardState>, action: &Action) -> Arc<DashboardState> {
    let Action::Dashboard(DashboardAction::SetWidgetTab { id, tab }) = action else {
        return Arc::clone(state);
    };
    let Some(current) = state.widgets.get(id) else {
        tracing::debug!("Ignoring tab change for unknown widget {}", id);
        return Arc::clone(state);
    };
    let mut widgets = state.widgets.clone();
    widgets.insert(
        *id,
        DashboardWidget {
            current_tab: *tab,
            ..current.clone()
        },
    );
    Arc::new(DashboardState {
        widgets,
        current_widgets: state.current_widgets.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::ui::UiAction;

    #[test]
    fn default_widgets_in_order() {
        let s = DashboardState::default();
        let titles: Vec<&str> = s.ordered().iter().map(|w| w.title_key.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "dashboard.cost_summary",
                "dashboard.compute",
                "dashboard.storage",
                "dashboard.network",
                "dashboard.database"
            ]
        );
        assert_eq!(s.widget(0).unwrap().current_tab, DashboardTab::Projects);
    }

    #[test]
    fn set_widget_tab_updates_only_that_widget() {
        let s = Arc::new(DashboardState::default());
        let next = reducer(
            &s,
            &Action::Dashboard(DashboardAction::SetWidgetTab {
                id: 0,
                tab: DashboardTab::Accounts,
            }),
        );
        assert_eq!(next.widget(0).unwrap().current_tab, DashboardTab::Accounts);
        assert_eq!(next.widget(1), s.widget(1));
        assert_eq!(s.widget(0).unwrap().current_tab, DashboardTab::Projects);
    }

    #[test]
    fn unknown_widget_is_a_no_op() {
        let s = Arc::new(DashboardState::default());
        let next = reducer(
            &s,
            &Action::Dashboard(DashboardAction::SetWidgetTab {
                id: 99,
                tab: DashboardTab::Regions,
            }),
        );
        assert!(Arc::ptr_eq(&s, &next));
    }

    #[test]
    fn other_slice_actions_return_same_state() {
        let s = Arc::new(DashboardState::default());
        let next = reducer(&s, &Action::Ui(UiAction::OpenExportModal));
        assert!(Arc::ptr_eq(&s, &next));
    }

    #[test]
    fn tab_group_by_mapping() {
        assert_eq!(DashboardTab::Projects.group_by(), GroupBy::Project);
        assert_eq!(DashboardTab::Regions.group_by(), GroupBy::Region);
        assert_eq!(DashboardTab::from_id("Clusters"), Some(DashboardTab::Clusters));
        assert_eq!(DashboardTab::from_id("nodes"), None);
    }
}
