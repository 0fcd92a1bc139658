//! Content checks for a fetched endpoint document.
//!
//! Every rule is evaluated independently and appends at most one issue line,
//! in the fixed order CORS, version, geolocation, staleness.

use crate::document::SpaceDocument;
use crate::util::format_epoch;
use chrono::{DateTime, Months, Utc};

pub const CORS_ISSUE: &str = "CORS not enabled.";
pub const NO_VERSION_ISSUE: &str = "no api version found.";
pub const UPGRADE_ISSUE: &str = "Please upgrade spaceapi to latest version.";

/// Oldest schema version that is not flagged.
pub const DEFAULT_MIN_API_VERSION: f64 = 0.13;
pub const DEFAULT_STALENESS_MONTHS: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationPolicy {
    pub min_api_version: f64,
    /// Age after which `state.lastchange` counts as stale.
    pub staleness_months: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_api_version: DEFAULT_MIN_API_VERSION,
            staleness_months: DEFAULT_STALENESS_MONTHS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Issue lines for a successfully fetched document. Pure in `doc` and `now`.
    pub fn validate(&self, doc: &SpaceDocument, cors_enabled: bool, now: DateTime<Utc>) -> Vec<String> {
        let mut issues = Vec::new();

        if !cors_enabled {
            issues.push(CORS_ISSUE.to_string());
        }
        issues.extend(self.check_version(doc));
        issues.extend(check_geo(doc));
        issues.extend(self.check_staleness(doc, now));

        issues
    }

    fn check_version(&self, doc: &SpaceDocument) -> Option<String> {
        let Some(version) = doc.api_version() else {
            return Some(NO_VERSION_ISSUE.to_string());
        };
        // A version that does not read as a number predates the numeric schemes.
        match version.value {
            Some(value) if value >= self.policy.min_api_version => None,
            _ => Some(UPGRADE_ISSUE.to_string()),
        }
    }

    fn check_staleness(&self, doc: &SpaceDocument, now: DateTime<Utc>) -> Option<String> {
        let last_change = doc.last_change?;
        let cutoff = now
            .checked_sub_months(Months::new(self.policy.staleness_months))
            .unwrap_or(now);

        (last_change < cutoff.timestamp()).then(|| {
            format!(
                "Date lastchange longer than {} months ago. ({})",
                self.policy.staleness_months,
                format_epoch(last_change)
            )
        })
    }
}

fn check_geo(doc: &SpaceDocument) -> Option<String> {
    let point = doc.geo_point()?;
    let out_of_range = !(-180.0..=180.0).contains(&point.lon) || !(-90.0..=90.0).contains(&point.lat);

    out_of_range.then(|| format!("Wrong lat/lon is: [lat {:.4} / lon {:.4}]", point.lat, point.lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn validate(value: serde_json::Value, cors: bool) -> Vec<String> {
        Validator::default().validate(&SpaceDocument::from_value(&value), cors, now())
    }

    fn compliant() -> serde_json::Value {
        json!({
            "api_compatibility": ["14"],
            "location": { "lon": 90.0, "lat": 45.0 },
            "state": { "lastchange": now().timestamp() - 3600 }
        })
    }

    #[test]
    fn test_compliant_document_has_no_issues() {
        assert!(validate(compliant(), true).is_empty());
    }

    #[test]
    fn test_missing_cors() {
        assert_eq!(validate(compliant(), false), vec![CORS_ISSUE.to_string()]);
    }

    #[test]
    fn test_explicit_version_wins() {
        let issues = validate(json!({ "api": "0.12", "api_compatibility": ["14"] }), true);
        assert_eq!(issues, vec![UPGRADE_ISSUE.to_string()]);

        let issues = validate(json!({ "api": "0.13", "api_compatibility": ["0.1"] }), true);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_compatibility_list_first_element_used() {
        assert!(validate(json!({ "api_compatibility": ["14", "0.1"] }), true).is_empty());
        assert_eq!(
            validate(json!({ "api_compatibility": ["0.1", "14"] }), true),
            vec![UPGRADE_ISSUE.to_string()]
        );
    }

    #[test]
    fn test_no_version_found() {
        assert_eq!(validate(json!({}), true), vec![NO_VERSION_ISSUE.to_string()]);
        assert_eq!(
            validate(json!({ "api_compatibility": [] }), true),
            vec![NO_VERSION_ISSUE.to_string()]
        );
        // A malformed first item is not skipped in favour of the second.
        assert_eq!(
            validate(json!({ "api_compatibility": [null, "14"] }), true),
            vec![NO_VERSION_ISSUE.to_string()]
        );
    }

    #[test]
    fn test_unparseable_version_asks_for_upgrade() {
        assert_eq!(validate(json!({ "api": "v-old" }), true), vec![UPGRADE_ISSUE.to_string()]);
    }

    #[test]
    fn test_configured_minimum_version() {
        let validator = Validator::new(ValidationPolicy {
            min_api_version: 14.0,
            ..ValidationPolicy::default()
        });
        let doc = SpaceDocument::from_value(&json!({ "api": "0.13" }));
        assert_eq!(validator.validate(&doc, true, now()), vec![UPGRADE_ISSUE.to_string()]);
    }

    #[test]
    fn test_out_of_range_longitude() {
        let issues = validate(json!({ "api": "0.13", "location": { "lon": 200.0, "lat": 45.0 } }), true);
        assert_eq!(issues, vec!["Wrong lat/lon is: [lat 45.0000 / lon 200.0000]".to_string()]);
    }

    #[test]
    fn test_out_of_range_latitude() {
        let issues = validate(json!({ "api": "0.13", "lon": 12.345678, "lat": -95.0 }), true);
        assert_eq!(issues, vec!["Wrong lat/lon is: [lat -95.0000 / lon 12.3457]".to_string()]);
    }

    #[test]
    fn test_boundary_coordinates_are_valid() {
        for (lon, lat) in [(180.0, 90.0), (-180.0, -90.0), (90.0, 45.0), (0.0, 0.0)] {
            let issues = validate(json!({ "api": "0.13", "location": { "lon": lon, "lat": lat } }), true);
            assert!(issues.is_empty(), "({lon}, {lat}) flagged: {issues:?}");
        }
    }

    #[test]
    fn test_missing_location_is_not_an_issue() {
        assert!(validate(json!({ "api": "0.13" }), true).is_empty());
    }

    #[test]
    fn test_stale_lastchange() {
        let old = now().timestamp() - 400 * 86_400;
        let issues = validate(json!({ "api": "0.13", "state": { "lastchange": old } }), true);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Date lastchange longer than 3 months ago. (2025-09-13"));
    }

    #[test]
    fn test_recent_lastchange_not_stale() {
        let recent = now().timestamp() - 60 * 86_400;
        assert!(validate(json!({ "api": "0.13", "state": { "lastchange": recent } }), true).is_empty());
    }

    #[test]
    fn test_configured_staleness_window() {
        let validator = Validator::new(ValidationPolicy {
            staleness_months: 1,
            ..ValidationPolicy::default()
        });
        let doc = SpaceDocument::from_value(&json!({
            "api": "0.13",
            "state": { "lastchange": now().timestamp() - 60 * 86_400 }
        }));
        let issues = validator.validate(&doc, true, now());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("1 months ago"));
    }

    #[test]
    fn test_all_rules_reported_in_order() {
        let issues = validate(
            json!({
                "api": "0.10",
                "location": { "lon": 10.0, "lat": 95.0 },
                "state": { "lastchange": now().timestamp() - 400 * 86_400 }
            }),
            false,
        );
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0], CORS_ISSUE);
        assert_eq!(issues[1], UPGRADE_ISSUE);
        assert!(issues[2].starts_with("Wrong lat/lon"));
        assert!(issues[3].starts_with("Date lastchange"));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let doc = SpaceDocument::from_value(&json!({ "api": "0.9", "lon": 500.0, "lat": 0.0 }));
        let validator = Validator::default();
        assert_eq!(
            validator.validate(&doc, false, now()),
            validator.validate(&doc, false, now())
        );
    }
}
