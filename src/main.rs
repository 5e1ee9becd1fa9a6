mod cli;
mod core;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "costscope", about = "Cost management reports and cost models CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a report and print it as a chart series
    Chart {
        /// Platform (ocp|aws|azure|ocp-cloud)
        #[arg(short, long, default_value = "ocp")]
        platform: String,

        /// Report kind (cost|cpu|memory|volume|storage|instance|database|network)
        #[arg(short, long, default_value = "cost")]
        report: String,

        /// Chart kind (rolling|daily|monthly)
        #[arg(short, long, default_value = "rolling")]
        kind: String,

        /// Group by date or a label (project, cluster, account, tag:<key>, ...)
        #[arg(short, long, default_value = "date")]
        group_by: String,

        /// Report item (cost|infrastructure|supplementary|usage)
        #[arg(long, default_value = "cost")]
        item: String,

        /// Value field (total|raw|markup|usage|none)
        #[arg(long, default_value = "total")]
        value: String,

        /// Also fetch the previous month
        #[arg(long)]
        compare: bool,

        /// Number of grouped items
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// Show the overview dashboard widgets
    Dashboard {
        #[arg(short, long, default_value = "ocp")]
        platform: String,

        /// Only show this widget
        #[arg(short, long)]
        widget: Option<u32>,

        /// Switch the widget's tab (projects|clusters|services|accounts|regions)
        #[arg(short, long)]
        tab: Option<String>,
    },
    /// Print the report URL for an export
    ExportQuery {
        #[arg(short, long, default_value = "ocp")]
        platform: String,

        #[arg(short, long, default_value = "cost")]
        report: String,

        #[arg(short, long, default_value = "project")]
        group_by: String,

        /// Resolution (daily|monthly)
        #[arg(long, default_value = "daily")]
        resolution: String,

        /// 0 for the current month, 1 for the previous one
        #[arg(long, default_value_t = 0)]
        months_back: u32,

        /// Export only these group labels (default: all)
        #[arg(short, long = "item")]
        items: Vec<String>,
    },
    /// Manage cost models
    CostModels {
        #[command(subcommand)]
        action: CostModelsAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CostModelsAction {
    /// List cost models
    List {
        /// Field to filter on
        #[arg(long, default_value = "name")]
        filter_type: String,

        /// Value to filter by
        #[arg(long)]
        filter: Option<String>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },
    /// Delete a cost model
    Delete { uuid: String },
    /// Set the markup percentage of a cost model
    Markup {
        uuid: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Add a rate to a cost model
    AddRate {
        uuid: String,

        #[arg(long)]
        metric: String,

        #[arg(long)]
        measurement: String,

        /// infrastructure|supplementary (default: the metric's default)
        #[arg(long)]
        cost_type: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Regular rate
        #[arg(long, allow_hyphen_values = true, conflicts_with = "tag_key")]
        rate: Option<String>,

        /// Tag key for a tag-based rate
        #[arg(long)]
        tag_key: Option<String>,

        /// Tag rate as value=rate (repeatable)
        #[arg(long = "tag", requires = "tag_key")]
        tags: Vec<String>,

        /// Tag value used when no other value matches
        #[arg(long, requires = "tag_key")]
        default_tag: Option<String>,
    },
    /// List the metrics rates can be set on
    Metrics {
        #[arg(long)]
        source_type: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("costscope=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("costscope=warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = core::config::AppConfig::load()
        .map(|c| c.settings)
        .unwrap_or_default();
    let output_opts = cli::output::OutputOptions::resolve(
        cli.format.as_deref(),
        cli.json,
        cli.pretty,
        cli.no_color,
        cli.verbose,
        &settings,
    );

    match cli.command {
        Commands::Chart {
            platform,
            report,
            kind,
            group_by,
            item,
            value,
            compare,
            limit,
        } => {
            let args = cli::chart_cmd::ChartArgs {
                platform,
                report,
                kind,
                group_by,
                item,
                value,
                compare,
                limit,
            };
            cli::chart_cmd::run(args, &output_opts).await?;
        }
        Commands::Dashboard {
            platform,
            widget,
            tab,
        } => cli::dashboard_cmd::run(&platform, widget, tab, &output_opts).await?,
        Commands::ExportQuery {
            platform,
            report,
            group_by,
            resolution,
            months_back,
            items,
        } => {
            let args = cli::export_cmd::ExportArgs {
                platform,
                report,
                group_by,
                resolution,
                months_back,
                items,
            };
            cli::export_cmd::run(args, &output_opts)?;
        }
        Commands::CostModels { action } => match action {
            CostModelsAction::List {
                filter_type,
                filter,
                limit,
                offset,
            } => {
                let args = cli::cost_models_cmd::ListArgs {
                    filter_type,
                    filter_value: filter,
                    limit,
                    offset,
                };
                cli::cost_models_cmd::list(args, &output_opts).await?;
            }
            CostModelsAction::Delete { uuid } => {
                cli::cost_models_cmd::delete(&uuid, &output_opts).await?
            }
            CostModelsAction::Markup { uuid, value } => {
                cli::cost_models_cmd::markup(&uuid, &value, &output_opts).await?
            }
            CostModelsAction::AddRate {
                uuid,
                metric,
                measurement,
                cost_type,
                description,
                rate,
                tag_key,
                tags,
                default_tag,
            } => {
                let args = cli::cost_models_cmd::AddRateArgs {
                    uuid,
                    metric,
                    measurement,
                    cost_type,
                    description,
                    rate,
                    tag_key,
                    tags,
                    default_tag,
                };
                cli::cost_models_cmd::add_rate(args, &output_opts).await?;
            }
            CostModelsAction::Metrics { source_type } => {
                cli::cost_models_cmd::metrics(source_type.as_deref(), &output_opts).await?
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
        },
    }

    Ok(())
}
