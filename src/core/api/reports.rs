use super::{ApiClient, ApiError};
use crate::core::models::report::{Platform, ReportKind, Report};

/// Relative API path for a report, or `None` when the platform has no such report.
pub fn report_path(platform: Platform, kind: ReportKind) -> Option<&'static str> {
    use Platform::*;
    use ReportKind::*;
    let path = match (platform, kind) {
        (Ocp, Cost) => "reports/openshift/costs/",
        (Ocp, Cpu) => "reports/openshift/compute/",
        (Ocp, Memory) => "reports/openshift/memory/",
        (Ocp, Volume) => "reports/openshift/volumes/",
        (Ocp, Tag) => "tags/openshift/",

        (Aws, Cost | Database | Network) => "reports/aws/costs/",
        (Aws, Storage) => "reports/aws/storage/",
        (Aws, Instance) => "reports/aws/instance-types/",
        (Aws, Tag) => "tags/aws/",

        (Azure, Cost | Database | Network) => "reports/azure/costs/",
        (Azure, Storage) => "reports/azure/storage/",
        (Azure, Instance) => "reports/azure/instance-types/",
        (Azure, Tag) => "tags/azure/",

        (OcpCloud, Cost | Database | Network) => "reports/openshift/infrastructures/all/costs/",
        (OcpCloud, Storage) => "reports/openshift/infrastructures/all/storage/",
        (OcpCloud, Instance) => "reports/openshift/infrastructures/all/instance-types/",
        (OcpCloud, Cpu) => "reports/openshift/compute/",
        (OcpCloud, Memory) => "reports/openshift/memory/",

        _ => return None,
    };
    Some(path)
}

/// `<path>?<query>`, or the bare path for an empty query.
pub fn report_url_path(platform: Platform, kind: ReportKind, query: &str) -> Result<String, ApiError> {
    let path = report_path(platform, kind).ok_or_else(|| ApiError::UnsupportedReport {
        platform: platform.display_name().to_string(),
        kind: kind.id().to_string(),
    })?;
    if query.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{}?{}", path, query))
    }
}

impl ApiClient {
    /// GET a report and drop entries that fail date validation.
    pub async fn run_report(
        &self,
        platform: Platform,
        kind: ReportKind,
        query: &str,
    ) -> Result<Report, ApiError> {
        let url = self.url(&report_url_path(platform, kind, query)?)?;
        let report: Report = self.get_json(url).await?;
        tracing::debug!(
            "Fetched {} {} report with {} entries",
            platform.id(),
            kind.id(),
            report.data.len()
        );
        Ok(report.sanitize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocp_cost_report_path() {
        let query = "filter[resolution]=daily";
        assert_eq!(
            report_url_path(Platform::Ocp, ReportKind::Cost, query).unwrap(),
            "reports/openshift/costs/?filter[resolution]=daily"
        );
    }

    #[test]
    fn empty_query_has_no_question_mark() {
        assert_eq!(
            report_url_path(Platform::Aws, ReportKind::Instance, "").unwrap(),
            "reports/aws/instance-types/"
        );
    }

    #[test]
    fn cloud_database_uses_cost_endpoint() {
        assert_eq!(
            report_path(Platform::OcpCloud, ReportKind::Database),
            Some("reports/openshift/infrastructures/all/costs/")
        );
    }

    #[test]
    fn unsupported_combination_is_an_error() {
        assert_eq!(report_path(Platform::Ocp, ReportKind::Instance), None);
        let err = report_url_path(Platform::Ocp, ReportKind::Database, "").unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedReport { .. }));
        assert!(err.to_string().contains("OpenShift"));
    }
}
