use std::sync::Arc;

use super::fetch::FetchState;
use super::Action;
use crate::core::api::ApiError;
use crate::core::models::cost_model::{CostModel, CostModels};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    AddSource,
    DeleteSource,
    AddRate,
    UpdateRate,
    DeleteRate,
    UpdateCostModel,
    DeleteCostModel,
    UpdateMarkup,
    DeleteMarkup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogFlags {
    pub add_source: bool,
    pub delete_source: bool,
    pub add_rate: bool,
    pub update_rate: bool,
    pub delete_rate: bool,
    pub update_cost_model: bool,
    pub delete_cost_model: bool,
    pub update_markup: bool,
    pub delete_markup: bool,
}

impl DialogFlags {
    pub fn is_open(&self, dialog: Dialog) -> bool {
        match dialog {
            Dialog::AddSource => self.add_source,
            Dialog::DeleteSource => self.delete_source,
            Dialog::AddRate => self.add_rate,
            Dialog::UpdateRate => self.update_rate,
            Dialog::DeleteRate => self.delete_rate,
            Dialog::UpdateCostModel => self.update_cost_model,
            Dialog::DeleteCostModel => self.delete_cost_model,
            Dialog::UpdateMarkup => self.update_markup,
            Dialog::DeleteMarkup => self.delete_markup,
        }
    }

    fn set(mut self, dialog: Dialog, open: bool) -> Self {
        let slot = match dialog {
            Dialog::AddSource => &mut self.add_source,
            Dialog::DeleteSource => &mut self.delete_source,
            Dialog::AddRate => &mut self.add_rate,
            Dialog::UpdateRate => &mut self.update_rate,
            Dialog::DeleteRate => &mut self.delete_rate,
            Dialog::UpdateCostModel => &mut self.update_cost_model,
            Dialog::DeleteCostModel => &mut self.delete_cost_model,
            Dialog::UpdateMarkup => &mut self.update_markup,
            Dialog::DeleteMarkup => &mut self.delete_markup,
        };
        *slot = open;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToolbar {
    pub filter_type: String,
    pub filter_value: String,
}

impl Default for FilterToolbar {
    fn default() -> Self {
        Self {
            filter_type: "name".to_string(),
            filter_value: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CostModelsAction {
    FetchRequest,
    FetchSuccess(CostModels),
    FetchFailure(ApiError),
    UpdateRequest,
    UpdateSuccess(CostModel),
    UpdateFailure(ApiError),
    DeleteRequest,
    DeleteSuccess,
    DeleteFailure(ApiError),
    UpdateFilterToolbar {
        filter_type: Option<String>,
        filter_value: Option<String>,
    },
    SetDialog {
        dialog: Dialog,
        is_open: bool,
    },
    Select(CostModel),
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostModelsState {
    pub list: FetchState<CostModels, ApiError>,
    /// `data` holds the selected cost model.
    pub update: FetchState<CostModel, ApiError>,
    pub delete: FetchState<(), ApiError>,
    pub filter: FilterToolbar,
    pub dialogs: DialogFlags,
}

pub fn reducer(state: &Arc<CostModelsState>, action: &Action) -> Arc<CostModelsState> {
    let Action::CostModels(action) = action else {
        return Arc::clone(state);
    };
    let s: &CostModelsState = state;
    let next = match action {
        CostModelsAction::FetchRequest => CostModelsState {
            list: s.list.request(),
            ..s.clone()
        },
        CostModelsAction::FetchSuccess(models) => CostModelsState {
            list: s.list.succeed(models.clone()),
            filter: FilterToolbar {
                filter_value: String::new(),
                ..s.filter.clone()
            },
            ..s.clone()
        },
        CostModelsAction::FetchFailure(error) => CostModelsState {
            list: s.list.fail(error.clone()),
            ..s.clone()
        },
        CostModelsAction::UpdateRequest => CostModelsState {
            update: s.update.request(),
            ..s.clone()
        },
        CostModelsAction::UpdateSuccess(model) => CostModelsState {
            update: s.update.succeed(model.clone()),
            ..s.clone()
        },
        CostModelsAction::UpdateFailure(error) => CostModelsState {
            update: s.update.fail(error.clone()),
            ..s.clone()
        },
        CostModelsAction::DeleteRequest => CostModelsState {
            delete: s.delete.request(),
            ..s.clone()
        },
        CostModelsAction::DeleteSuccess => CostModelsState {
            delete: s.delete.succeed(()),
            ..s.clone()
        },
        CostModelsAction::DeleteFailure(error) => CostModelsState {
            delete: s.delete.fail(error.clone()),
            ..s.clone()
        },
        CostModelsAction::UpdateFilterToolbar {
            filter_type,
            filter_value,
        } => CostModelsState {
            filter: FilterToolbar {
                filter_type: filter_type
                    .clone()
                    .unwrap_or_else(|| s.filter.filter_type.clone()),
                filter_value: filter_value
                    .clone()
                    .unwrap_or_else(|| s.filter.filter_value.clone()),
            },
            ..s.clone()
        },
        CostModelsAction::SetDialog { dialog, is_open } => CostModelsState {
            dialogs: s.dialogs.set(*dialog, *is_open),
            ..s.clone()
        },
        CostModelsAction::Select(model) => CostModelsState {
            update: s.update.with_data(Some(model.clone())),
            ..s.clone()
        },
        CostModelsAction::Reset => CostModelsState {
            update: s.update.with_data(None),
            ..s.clone()
        },
    };
    Arc::new(next)
}
