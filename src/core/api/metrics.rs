use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::core::models::cost_model::{metric_hash, MetricDefinition, MetricHash};

const METRICS_PATH: &str = "metrics/?limit=100";

#[derive(Deserialize)]
struct MetricsResponse {
    #[serde(default)]
    data: Vec<MetricDefinition>,
}

impl ApiClient {
    /// Fetch the rate metrics catalog, optionally restricted to one source type.
    pub async fn fetch_metrics(&self, source_type: Option<&str>) -> Result<MetricHash, ApiError> {
        let response: MetricsResponse = self.get_json(self.url(METRICS_PATH)?).await?;
        let definitions = response
            .data
            .into_iter()
            .filter(|d| source_type.map_or(true, |s| d.source_type.eq_ignore_ascii_case(s)))
            .collect();
        Ok(metric_hash(definitions))
    }
}
