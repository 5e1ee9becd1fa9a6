use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub permission: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rbac {
    pub is_org_admin: bool,
    pub permissions: Option<Vec<Permission>>,
}

/// Whether the user may create, edit or delete cost models.
///
/// Org admins always may. Otherwise the first `cost-management` permission
/// decides: `cost-management:*:*` or `...:rate:write` grant access.
pub fn is_cost_model_write_permission(rbac: &Rbac) -> bool {
    if rbac.is_org_admin {
        return true;
    }
    let Some(permissions) = &rbac.permissions else {
        return false;
    };
    let Some(cost_permission) = permissions
        .iter()
        .find(|p| p.permission.starts_with("cost-management"))
    else {
        return false;
    };
    let mut parts = cost_permission.permission.split(':');
    let (app, resource, operation) = (parts.next(), parts.next(), parts.next());
    if app == Some("cost-management") && resource == Some("*") && operation == Some("*") {
        return true;
    }
    resource == Some("rate") && operation == Some("write")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rbac(perms: &[&str]) -> Rbac {
        Rbac {
            is_org_admin: false,
            permissions: Some(
                perms
                    .iter()
                    .map(|p| Permission {
                        permission: p.to_string(),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn org_admin_can_write() {
        let r = Rbac {
            is_org_admin: true,
            permissions: None,
        };
        assert!(is_cost_model_write_permission(&r));
    }

    #[test]
    fn no_permissions_cannot_write() {
        assert!(!is_cost_model_write_permission(&Rbac::default()));
        assert!(!is_cost_model_write_permission(&rbac(&[])));
        assert!(!is_cost_model_write_permission(&rbac(&["inventory:*:*"])));
    }

    #[test]
    fn wildcard_and_rate_write_grant_access() {
        assert!(is_cost_model_write_permission(&rbac(&["cost-management:*:*"])));
        assert!(is_cost_model_write_permission(&rbac(&["cost-management:rate:write"])));
    }

    #[test]
    fn only_first_cost_permission_counts() {
        assert!(!is_cost_model_write_permission(&rbac(&[
            "cost-management:rate:read",
            "cost-management:rate:write",
        ])));
        assert!(!is_cost_model_write_permission(&rbac(&["cost-management:*:read"])));
    }
}
