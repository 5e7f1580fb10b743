use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Named optional view over a CapabilityStatement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapabilityModel {
    pub id: Option<String>,
    pub url: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub experimental: Option<bool>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub software: Option<Software>,
    pub implementation: Option<Implementation>,
    pub format: Vec<String>,
    pub contact: Vec<ContactDetail>,
    pub rest: Vec<Rest>,
}

impl CapabilityModel {
    pub(crate) fn read(object: &Map<String, Value>) -> Self {
        Self {
            id: lenient(object, "id"),
            url: lenient(object, "url"),
            version: lenient(object, "version"),
            name: lenient(object, "name"),
            title: lenient(object, "title"),
            status: lenient(object, "status"),
            experimental: lenient(object, "experimental"),
            date: lenient(object, "date"),
            publisher: lenient(object, "publisher"),
            description: lenient(object, "description"),
            kind: lenient(object, "kind"),
            software: lenient(object, "software"),
            implementation: lenient(object, "implementation"),
            format: lenient_field_seq(object, "format"),
            contact: lenient_field_seq(object, "contact"),
            rest: lenient_field_seq(object, "rest"),
        }
    }

    /// Calendar date of `date`, which FHIR allows as a full timestamp or a
    /// plain date. Partial dates (year, year-month) yield `None`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(date) {
            return Some(timestamp.date_naive());
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    /// `title`, falling back to `name`.
    pub fn display_name(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Software {
    pub name: Option<String>,
    pub version: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetail {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub telecom: Vec<ContactPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub system: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "use")]
    pub use_: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rest {
    pub mode: Option<String>,
    pub documentation: Option<String>,
    pub security: Option<RestSecurity>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub resource: Vec<RestResource>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub interaction: Vec<Interaction>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub search_param: Vec<SearchParam>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub operation: Vec<Operation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestSecurity {
    pub cors: Option<bool>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub service: Vec<CodeableConcept>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

impl CodeableConcept {
    /// `text`, else the first coding's display or code.
    pub fn label(&self) -> Option<&str> {
        self.text.as_deref().or_else(|| {
            self.coding
                .iter()
                .find_map(|c| c.display.as_deref().or(c.code.as_deref()))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    pub system: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub profile: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub supported_profile: Vec<String>,
    pub documentation: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub interaction: Vec<Interaction>,
    pub versioning: Option<String>,
    pub read_history: Option<bool>,
    pub update_create: Option<bool>,
    pub conditional_create: Option<bool>,
    pub conditional_read: Option<String>,
    pub conditional_update: Option<bool>,
    pub conditional_delete: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub search_include: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub search_rev_include: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub search_param: Vec<SearchParam>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub operation: Vec<Operation>,
}

impl RestResource {
    pub fn supports(&self, code: &str) -> bool {
        self.interaction.iter().any(|i| i.code == code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub code: String,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParam {
    pub name: String,
    pub definition: Option<String>,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub definition: Option<String>,
    pub documentation: Option<String>,
}

/// Deserialize an array keeping only the elements that match `T`. Anything
/// other than an array becomes empty.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(filter_seq(value))
}

fn lenient_field_seq<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Vec<T> {
    object.get(key).cloned().map(filter_seq).unwrap_or_default()
}

fn filter_seq<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}
