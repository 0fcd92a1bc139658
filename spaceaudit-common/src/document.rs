//! Typed view over a SpaceAPI endpoint document.
//!
//! Only the attributes the audit consumes are extracted. Each one is an
//! explicit `Option`: a missing attribute and an attribute of the wrong JSON
//! type both read as absent, so one malformed field never hides the rest of
//! the document.

use serde_json::Value;

/// A schema version as published, with its numeric reading if it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiVersion {
    pub raw: String,
    pub value: Option<f64>,
}

impl ApiVersion {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self {
                raw: s.clone(),
                value: s.trim().parse::<f64>().ok(),
            }),
            Value::Number(n) => Some(Self {
                raw: n.to_string(),
                value: n.as_f64(),
            }),
            _ => None,
        }
    }
}

/// Longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    fn from_object(value: &Value) -> Option<Self> {
        Some(Self {
            lon: value.get("lon")?.as_f64()?,
            lat: value.get("lat")?.as_f64()?,
        })
    }
}

/// Contact block of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub email: Option<String>,
    pub issue_mail: Option<String>,
    pub ml: Option<String>,
    pub twitter: Option<String>,
}

/// The consumed attributes of an endpoint document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpaceDocument {
    pub api: Option<ApiVersion>,
    /// Kept positionally; an item of the wrong JSON type is `None`.
    pub api_compatibility: Option<Vec<Option<ApiVersion>>>,
    /// `location.lon` / `location.lat` (0.12 and later).
    pub location: Option<GeoPoint>,
    /// Top-level `lon` / `lat` (schemas before 0.12).
    pub legacy_location: Option<GeoPoint>,
    /// `state.lastchange`, epoch seconds.
    pub last_change: Option<i64>,
    pub contact: Contact,
    /// `issue_report_channels`; non-string items keep their JSON text.
    pub issue_report_channels: Option<Vec<String>>,
}

impl SpaceDocument {
    pub fn from_value(value: &Value) -> Self {
        let contact = value.get("contact");
        let contact_field =
            |key: &str| contact.and_then(|c| c.get(key)).and_then(Value::as_str).map(str::to_owned);

        Self {
            api: value.get("api").and_then(ApiVersion::from_json),
            api_compatibility: value
                .get("api_compatibility")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(ApiVersion::from_json).collect()),
            location: value.get("location").and_then(GeoPoint::from_object),
            legacy_location: GeoPoint::from_object(value),
            last_change: value
                .get("state")
                .and_then(|s| s.get("lastchange"))
                .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f as i64))),
            contact: Contact {
                email: contact_field("email"),
                issue_mail: contact_field("issue_mail"),
                ml: contact_field("ml"),
                twitter: contact_field("twitter"),
            },
            issue_report_channels: value
                .get("issue_report_channels")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                }),
        }
    }

    /// Explicit `api` first, then the first compatibility entry.
    pub fn api_version(&self) -> Option<&ApiVersion> {
        self.api
            .as_ref()
            .or_else(|| {
                self.api_compatibility
                    .as_ref()
                    .and_then(|list| list.first())
                    .and_then(Option::as_ref)
            })
    }

    /// Nested location first, then the legacy top-level pair.
    pub fn geo_point(&self) -> Option<GeoPoint> {
        self.location.or(self.legacy_location)
    }
}
