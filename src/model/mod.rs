//! CapabilityStatement document and its typed read model.
//!
//! The document is stored exactly as fetched so that it serializes back to the
//! same JSON. [`CapabilityModel`] reads named optional fields out of it; a field
//! whose shape does not match is simply absent.

pub mod types;
pub mod views;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SchemaError;

pub use types::*;
pub use views::*;

/// The only `resourceType` accepted by the loader.
pub const RESOURCE_TYPE: &str = "CapabilityStatement";

#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityStatement {
    raw: Value,
    fhir_version: String,
    model: CapabilityModel,
}

impl CapabilityStatement {
    /// Check the presence rules and wrap the document. Nothing is renamed or
    /// dropped; `raw()` returns the input unchanged.
    pub fn from_value(raw: Value) -> Result<Self, SchemaError> {
        let object = raw.as_object().ok_or(SchemaError::NotAnObject)?;

        match object.get("resourceType") {
            None | Some(Value::Null) => return Err(SchemaError::MissingResourceType),
            Some(Value::String(rt)) if rt == RESOURCE_TYPE => {}
            Some(Value::String(rt)) => return Err(SchemaError::WrongResourceType(rt.clone())),
            Some(other) => return Err(SchemaError::WrongResourceType(other.to_string())),
        }

        let fhir_version = match object.get("fhirVersion") {
            Some(Value::String(v)) if !v.trim().is_empty() => v.clone(),
            _ => return Err(SchemaError::MissingFhirVersion),
        };

        let model = CapabilityModel::read(object);

        Ok(Self {
            raw,
            fhir_version,
            model,
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    pub fn fhir_version(&self) -> &str {
        &self.fhir_version
    }

    pub fn model(&self) -> &CapabilityModel {
        &self.model
    }
}

impl Serialize for CapabilityStatement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl TryFrom<Value> for CapabilityStatement {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Deserialize one field, treating a shape mismatch as absence.
pub(crate) fn lenient<T: serde::de::DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
) -> Option<T> {
    let value = object.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::debug!("Ignoring malformed CapabilityStatement.{}: {}", key, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_document_is_valid() {
        let doc = CapabilityStatement::from_value(json!({
            "resourceType": "CapabilityStatement",
            "fhirVersion": "4.0.1"
        }))
        .unwrap();

        assert_eq!(doc.fhir_version(), "4.0.1");
        assert_eq!(doc.model(), &CapabilityModel::default());
    }

    #[test]
    fn test_presence_rules() {
        assert_eq!(
            CapabilityStatement::from_value(json!([1, 2])),
            Err(SchemaError::NotAnObject)
        );
        assert_eq!(
            CapabilityStatement::from_value(json!({"fhirVersion": "4.0.1"})),
            Err(SchemaError::MissingResourceType)
        );
        assert_eq!(
            CapabilityStatement::from_value(json!({"resourceType": "Patient"})),
            Err(SchemaError::WrongResourceType("Patient".to_string()))
        );
        assert_eq!(
            CapabilityStatement::from_value(json!({"resourceType": "CapabilityStatement"})),
            Err(SchemaError::MissingFhirVersion)
        );
        assert_eq!(
            CapabilityStatement::from_value(
                json!({"resourceType": "CapabilityStatement", "fhirVersion": ""})
            ),
            Err(SchemaError::MissingFhirVersion)
        );
        assert_eq!(
            CapabilityStatement::from_value(
                json!({"resourceType": "CapabilityStatement", "fhirVersion": 4})
            ),
            Err(SchemaError::MissingFhirVersion)
        );
    }

    #[test]
    fn test_malformed_optional_field_is_absent() {
        let doc = CapabilityStatement::from_value(json!({
            "resourceType": "CapabilityStatement",
            "fhirVersion": "4.0.1",
            "name": "Demo",
            "software": "not-an-object",
            "rest": {"mode": "server"}
        }))
        .unwrap();

        assert_eq!(doc.model().name.as_deref(), Some("Demo"));
        assert!(doc.model().software.is_none());
        assert!(doc.model().rest.is_empty());
    }

    #[test]
    fn test_serializes_verbatim() {
        let body = r#"{"status":"active","resourceType":"CapabilityStatement","zeta":1,"fhirVersion":"4.0.1","alpha":{"b":2,"a":1}}"#;
        let raw: Value = serde_json::from_str(body).unwrap();
        let doc = CapabilityStatement::from_value(raw).unwrap();
        assert_eq!(serde_json::to_string(&doc).unwrap(), body);
    }
}
