use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::core::store::rbac::{Permission, Rbac};

const ACCESS_PATH: &str = "access/?application=cost-management&limit=100";

#[derive(Deserialize)]
struct AccessResponse {
    #[serde(default)]
    data: Vec<Permission>,
}

impl ApiClient {
    /// Fetch the caller's cost-management permissions. Returns `None` when no
    /// RBAC endpoint is configured.
    pub async fn fetch_rbac(&self, is_org_admin: bool) -> Option<Result<Rbac, ApiError>> {
        let url = match self.rbac_url(ACCESS_PATH)? {
            Ok(url) => url,
            Err(e) => return Some(Err(e)),
        };
        let result = self
            .get_json::<AccessResponse>(url)
            .await
            .map(|response| Rbac {
                is_org_admin,
                permissions: Some(response.data),
            });
        Some(result)
    }
}
