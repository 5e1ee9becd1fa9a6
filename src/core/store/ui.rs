use std::sync::Arc;

use super::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    OpenProvidersModal,
    CloseProvidersModal,
    OpenExportModal,
    CloseExportModal,
    ToggleSidebar,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub is_export_modal_open: bool,
    pub is_providers_modal_open: bool,
    pub is_sidebar_open: bool,
}

pub fn reducer(state: &Arc<UiState>, action: &Action) -> Arc<UiState> {
    let Action::Ui(action) = action else {
        return Arc::clone(state);
    };
    let next = match action {
        UiAction::OpenProvidersModal => UiState {
            is_providers_modal_open: true,
            ..**state
        },
        UiAction::CloseProvidersModal => UiState {
            is_providers_modal_open: false,
            ..**state
        },
        UiAction::OpenExportModal => UiState {
            is_export_modal_open: true,
            ..**state
        },
        UiAction::CloseExportModal => UiState {
            is_export_modal_open: false,
            ..**state
        },
        UiAction::ToggleSidebar => UiState {
            is_sidebar_open: !state.is_sidebar_open,
            ..**state
        },
    };
    Arc::new(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::cost_models::CostModelsAction;

    #[test]
    fn providers_modal_opens_and_closes() {
        let s = Arc::new(UiState::default());
        let s = reducer(&s, &Action::Ui(UiAction::OpenProvidersModal));
        assert!(s.is_providers_modal_open);
        let s = reducer(&s, &Action::Ui(UiAction::CloseProvidersModal));
        assert!(!s.is_providers_modal_open);
    }

    #[test]
    fn export_modal_flag() {
        let s = reducer(&Arc::new(UiState::default()), &Action::Ui(UiAction::OpenExportModal));
        assert!(s.is_export_modal_open);
        assert!(!s.is_sidebar_open);
    }

    #[test]
    fn toggle_sidebar_flips() {
        let s = Arc::new(UiState::default());
        let s = reducer(&s, &Action::Ui(UiAction::ToggleSidebar));
        assert!(s.is_sidebar_open);
        let s = reducer(&s, &Action::Ui(UiAction::ToggleSidebar));
        assert!(!s.is_sidebar_open);
    }

    #[test]
    fn other_slice_actions_return_same_state() {
        let s = Arc::new(UiState::default());
        let next = reducer(&s, &Action::CostModels(CostModelsAction::FetchRequest));
        assert!(Arc::ptr_eq(&s, &next));
    }
}
