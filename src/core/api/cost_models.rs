use super::{ApiClient, ApiError};
use crate::core::models::cost_model::{CostModel, CostModels};

const COST_MODELS_PATH: &str = "cost-models/";

fn cost_model_path(uuid: &str) -> String {
    format!("{}{}/", COST_MODELS_PATH, uuid)
}

impl ApiClient {
    pub async fn fetch_cost_models(&self, query: &str) -> Result<CostModels, ApiError> {
        let path = if query.is_empty() {
            COST_MODELS_PATH.to_string()
        } else {
            format!("{}?{}", COST_MODELS_PATH, query)
        };
        self.get_json(self.url(&path)?).await
    }

    pub async fn update_cost_model(&self, uuid: &str, model: &CostModel) -> Result<CostModel, ApiError> {
        self.put_json(self.url(&cost_model_path(uuid))?, model).await
    }

    pub async fn delete_cost_model(&self, uuid: &str) -> Result<(), ApiError> {
        self.delete(self.url(&cost_model_path(uuid))?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_model_path_has_trailing_slash() {
        assert_eq!(cost_model_path("abc-123"), "cost-models/abc-123/");
    }

    #[test]
    fn deserialize_cost_models_page() {
        let json = r#"{
            "meta": { "count": 1 },
            "links": { "first": "/x", "next": null },
            "data": [ { "uuid": "abc", "name": "Default", "source_type": "OCP" } ]
        }"#;
        let page: CostModels = serde_json::from_str(json).unwrap();
        assert_eq!(page.meta.count, 1);
        assert_eq!(page.data[0].name, "Default");
        assert!(page.data[0].rates.is_empty());
    }
}
