pub mod chart_cmd;
pub mod config_cmd;
pub mod cost_models_cmd;
pub mod dashboard_cmd;
pub mod export_cmd;
pub mod output;
pub mod renderer;
