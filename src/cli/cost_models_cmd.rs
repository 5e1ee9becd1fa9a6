use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::api::query::cost_models_query;
use crate::core::api::ApiClient;
use crate::core::config::AppConfig;
use crate::core::cost_model::{validate_markup, RateForm, TagValueRow};
use crate::core::i18n::{MessageCatalog, MessageParams, Translator};
use crate::core::models::cost_model::{CostModel, CostType, Markup, RateKind};
use crate::core::store::cost_models::{CostModelsAction, Dialog};
use crate::core::store::rbac::is_cost_model_write_permission;
use crate::core::store::{Action, Store};

pub struct ListArgs {
    pub filter_type: String,
    pub filter_value: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub struct AddRateArgs {
    pub uuid: String,
    pub metric: String,
    pub measurement: String,
    pub cost_type: Option<String>,
    pub description: Option<String>,
    pub rate: Option<String>,
    pub tag_key: Option<String>,
    /// `value=rate` pairs.
    pub tags: Vec<String>,
    pub default_tag: Option<String>,
}

struct Session {
    client: ApiClient,
    catalog: MessageCatalog,
    org_admin: bool,
    store: Store,
}

impl Session {
    fn open() -> Result<Self> {
        let config = AppConfig::load().context("Failed to load config")?;
        Ok(Self {
            client: ApiClient::from_config(&config.api).context("Failed to create API client")?,
            catalog: MessageCatalog::load_or_default(config.locale.catalog_path.as_deref()),
            org_admin: config.api.org_admin,
            store: Store::new(),
        })
    }

    fn dispatch(&mut self, action: CostModelsAction) {
        self.store.dispatch(Action::CostModels(action));
    }

    /// `None` when no RBAC endpoint is configured.
    async fn can_write(&self) -> Option<bool> {
        match self.client.fetch_rbac(self.org_admin).await? {
            Ok(rbac) => Some(is_cost_model_write_permission(&rbac)),
            Err(e) => {
                tracing::warn!("RBAC lookup failed: {}", e);
                Some(false)
            }
        }
    }

    async fn require_write(&self) -> Result<()> {
        if self.can_write().await == Some(false) {
            bail!("No permission to change cost models (needs cost-management:rate:write)");
        }
        Ok(())
    }

    async fn fetch_list(&mut self, query: &str) -> Result<()> {
        self.dispatch(CostModelsAction::FetchRequest);
        match self.client.fetch_cost_models(query).await {
            Ok(models) => self.dispatch(CostModelsAction::FetchSuccess(models)),
            Err(e) => self.dispatch(CostModelsAction::FetchFailure(e)),
        }
        if let Some(error) = &self.store.cost_models.list.error {
            return Err(error.clone()).context("Failed to fetch cost models");
        }
        Ok(())
    }

    /// Look up one cost model by uuid and make it the selected one.
    async fn select(&mut self, uuid: &str) -> Result<CostModel> {
        self.fetch_list(&cost_models_query("uuid", uuid, None, None)).await?;
        let found = self
            .store
            .cost_models
            .list
            .data
            .as_ref()
            .and_then(|page| page.data.iter().find(|m| m.uuid.as_deref() == Some(uuid)))
            .cloned();
        let Some(model) = found else {
            bail!("Cost model not found: {}", uuid);
        };
        self.dispatch(CostModelsAction::Select(model.clone()));
        Ok(model)
    }

    async fn save(&mut self, dialog: Dialog, uuid: &str, model: &CostModel) -> Result<CostModel> {
        self.dispatch(CostModelsAction::SetDialog { dialog, is_open: true });
        self.dispatch(CostModelsAction::UpdateRequest);
        match self.client.update_cost_model(uuid, model).await {
            Ok(updated) => self.dispatch(CostModelsAction::UpdateSuccess(updated)),
            Err(e) => self.dispatch(CostModelsAction::UpdateFailure(e)),
        }
        self.dispatch(CostModelsAction::SetDialog { dialog, is_open: false });

        let state = &self.store.cost_models.update;
        if let Some(error) = &state.error {
            return Err(error.clone()).context("Failed to update cost model");
        }
        state.data.clone().context("Update returned no cost model")
    }

    fn errors_message(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|k| self.catalog.translate(k, &MessageParams::new()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn print_model(model: &CostModel, verb: &str, opts: &OutputOptions) -> Result<()> {
    match opts.format {
        OutputFormat::Text => println!("{} cost model: {}", verb, model.name),
        OutputFormat::Json => println!("{}", opts.to_json(model)?),
    }
    Ok(())
}

pub async fn list(args: ListArgs, opts: &OutputOptions) -> Result<()> {
    let mut session = Session::open()?;
    session.dispatch(CostModelsAction::UpdateFilterToolbar {
        filter_type: Some(args.filter_type),
        filter_value: args.filter_value,
    });
    let filter = session.store.cost_models.filter.clone();
    let query = cost_models_query(&filter.filter_type, &filter.filter_value, args.limit, args.offset);
    session.fetch_list(&query).await?;
    let can_write = session.can_write().await;

    let models = session.store.cost_models.list.data.clone().unwrap_or_default();
    match opts.format {
        OutputFormat::Text => println!(
            "{}",
            renderer::render_cost_models(&models, can_write, opts.use_color)
        ),
        OutputFormat::Json => println!("{}", opts.to_json(&models)?),
    }
    Ok(())
}

#[derive(Serialize)]
struct Deleted<'a> {
    deleted: &'a str,
}

pub async fn delete(uuid: &str, opts: &OutputOptions) -> Result<()> {
    let mut session = Session::open()?;
    session.require_write().await?;

    session.dispatch(CostModelsAction::SetDialog {
        dialog: Dialog::DeleteCostModel,
        is_open: true,
    });
    session.dispatch(CostModelsAction::DeleteRequest);
    match session.client.delete_cost_model(uuid).await {
        Ok(()) => session.dispatch(CostModelsAction::DeleteSuccess),
        Err(e) => session.dispatch(CostModelsAction::DeleteFailure(e)),
    }
    session.dispatch(CostModelsAction::SetDialog {
        dialog: Dialog::DeleteCostModel,
        is_open: false,
    });
    if let Some(error) = &session.store.cost_models.delete.error {
        return Err(error.clone()).context(format!("Failed to delete cost model {}", uuid));
    }

    match opts.format {
        OutputFormat::Text => println!("Deleted cost model: {}", uuid),
        OutputFormat::Json => println!("{}", opts.to_json(&Deleted { deleted: uuid })?),
    }
    Ok(())
}

pub async fn markup(uuid: &str, value: &str, opts: &OutputOptions) -> Result<()> {
    let mut session = Session::open()?;
    let value = match validate_markup(value).and_then(|m| m.submit()) {
        Ok(v) => v,
        Err(key) => bail!("{}", session.errors_message(&[key])),
    };
    session.require_write().await?;

    let model = session.select(uuid).await?;
    let updated = CostModel {
        markup: Markup {
            value: Some(value),
            ..Markup::default()
        },
        ..model
    };
    let saved = session.save(Dialog::UpdateMarkup, uuid, &updated).await?;
    print_model(&saved, "Updated markup on", opts)
}

/// Fill a rate form from command-line arguments.
fn fill_form(args: &AddRateArgs, metrics: &crate::core::models::cost_model::MetricHash) -> Result<RateForm> {
    let mut form = RateForm::new();
    form.set_metric(&args.metric);
    form.set_measurement(&args.measurement, metrics);
    if let Some(cost_type) = &args.cost_type {
        let Some(cost_type) = CostType::from_id(cost_type) else {
            bail!("Unknown cost type: '{}' (infrastructure|supplementary)", cost_type);
        };
        form.calculation = cost_type;
    }
    form.description = args.description.clone().unwrap_or_default();

    match &args.tag_key {
        Some(tag_key) => {
            form.rate_kind = RateKind::Tagging;
            form.tag_key = tag_key.clone();
            for pair in &args.tags {
                let (tag_value, value) = pair.split_once('=').unwrap_or((pair.as_str(), ""));
                form.add_tag_value(TagValueRow {
                    tag_value: tag_value.to_string(),
                    value: value.to_string(),
                    description: String::new(),
                    is_default: args.default_tag.as_deref() == Some(tag_value),
                });
            }
        }
        None => {
            form.rate_kind = RateKind::Regular;
            form.regular_rate = args.rate.clone().unwrap_or_default();
        }
    }
    Ok(form)
}

pub async fn add_rate(args: AddRateArgs, opts: &OutputOptions) -> Result<()> {
    let mut session = Session::open()?;
    session.require_write().await?;

    let model = session.select(&args.uuid).await?;
    let metrics = session
        .client
        .fetch_metrics(None)
        .await
        .context("Failed to fetch metrics")?;

    let form = fill_form(&args, &metrics)?;
    let rate = match form.to_rate(&metrics, &model.rates) {
        Ok(rate) => rate,
        Err(errors) => bail!("{}", session.errors_message(&errors.keys())),
    };

    let mut updated = model;
    updated.rates.push(rate);
    let saved = session.save(Dialog::AddRate, &args.uuid, &updated).await?;
    print_model(&saved, "Added rate to", opts)
}

pub async fn metrics(source_type: Option<&str>, opts: &OutputOptions) -> Result<()> {
    let session = Session::open()?;
    let metrics = session
        .client
        .fetch_metrics(source_type)
        .await
        .context("Failed to fetch metrics")?;
    match opts.format {
        OutputFormat::Text => println!("{}", renderer::render_metrics(&metrics, opts.use_color)),
        OutputFormat::Json => println!("{}", opts.to_json(&metrics)?),
    }
    Ok(())
}
