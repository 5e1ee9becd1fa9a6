pub mod api;
pub mod chart;
pub mod computed;
pub mod config;
pub mod cost_model;
pub mod formatter;
pub mod i18n;
pub mod models;
pub mod store;
