pub mod cost_models;
pub mod dashboard;
pub mod fetch;
pub mod rbac;
pub mod ui;

use std::sync::Arc;

use cost_models::{CostModelsAction, CostModelsState};
use dashboard::{DashboardAction, DashboardState};
use ui::{UiAction, UiState};

/// Every action, tagged by the slice that handles it.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CostModels(CostModelsAction),
    Ui(UiAction),
    Dashboard(DashboardAction),
}

/// Explicit per-slice state. Each slice is replaced, never mutated, and a
/// slice that ignores an action keeps the same `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub cost_models: Arc<CostModelsState>,
    pub ui: Arc<UiState>,
    pub dashboard: Arc<DashboardState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::trace!("dispatch {:?}", action);
        self.cost_models = cost_models::reducer(&self.cost_models, &action);
        self.ui = ui::reducer(&self.ui, &action);
        self.dashboard = dashboard::reducer(&self.dashboard, &action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard::DashboardTab;
    use fetch::FetchStatus;

    #[test]
    fn dispatch_touches_only_the_owning_slice() {
        let mut store = Store::new();
        let ui_before = Arc::clone(&store.ui);
        let dashboard_before = Arc::clone(&store.dashboard);

        store.dispatch(Action::CostModels(CostModelsAction::FetchRequest));

        assert_eq!(store.cost_models.list.status, FetchStatus::InProgress);
        assert!(Arc::ptr_eq(&ui_before, &store.ui));
        assert!(Arc::ptr_eq(&dashboard_before, &store.dashboard));
    }

    #[test]
    fn dispatch_dashboard_and_ui() {
        let mut store = Store::new();
        store.dispatch(Action::Dashboard(DashboardAction::SetWidgetTab {
            id: 0,
            tab: DashboardTab::Clusters,
        }));
        store.dispatch(Action::Ui(UiAction::ToggleSidebar));
        assert_eq!(
            store.dashboard.widget(0).unwrap().current_tab,
            DashboardTab::Clusters
        );
        assert!(store.ui.is_sidebar_open);
        assert_eq!(store.cost_models.list.status, FetchStatus::None);
    }
}
