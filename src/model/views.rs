//! Grouped, ordered views derived from a [`CapabilityModel`], one per display tab.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{CapabilityModel, CapabilityStatement, Operation, SearchParam};

/// FHIR restful interaction codes in specification order.
pub const INTERACTION_ORDER: &[&str] = &[
    "read",
    "vread",
    "update",
    "patch",
    "delete",
    "history-instance",
    "history-type",
    "create",
    "search-type",
];

/// Whether a group belongs to the whole server or to one resource type.
/// `System` sorts first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Scope {
    System,
    Resource(String),
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::System => f.write_str("System"),
            Scope::Resource(resource_type) => f.write_str(resource_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub name: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    pub kind: Option<String>,
    pub fhir_version: String,
    pub software: Option<String>,
    pub implementation: Option<String>,
    pub formats: Vec<String>,
    pub contacts: Vec<String>,
    pub resource_count: usize,
}

pub fn overview(doc: &CapabilityStatement) -> Overview {
    let model = doc.model();

    let software = model.software.as_ref().and_then(|s| {
        match (s.name.as_deref(), s.version.as_deref()) {
            (Some(name), Some(version)) => Some(format!("{name} {version}")),
            (Some(name), None) => Some(name.to_string()),
            (None, Some(version)) => Some(version.to_string()),
            (None, None) => None,
        }
    });

    let implementation = model
        .implementation
        .as_ref()
        .and_then(|i| i.description.clone().or_else(|| i.url.clone()));

    let contacts = model
        .contact
        .iter()
        .filter_map(|contact| {
            let telecom: Vec<&str> = contact
                .telecom
                .iter()
                .filter_map(|t| t.value.as_deref())
                .collect();
            match (contact.name.as_deref(), telecom.is_empty()) {
                (Some(name), true) => Some(name.to_string()),
                (Some(name), false) => Some(format!("{name} ({})", telecom.join(", "))),
                (None, false) => Some(telecom.join(", ")),
                (None, true) => None,
            }
        })
        .collect();

    let date = model
        .parsed_date()
        .map(|d| d.format("%B %-d, %Y").to_string())
        .or_else(|| model.date.clone());

    Overview {
        name: model.display_name().map(str::to_string),
        status: model.status.clone(),
        date,
        publisher: model.publisher.clone(),
        kind: model.kind.clone(),
        fhir_version: doc.fhir_version().to_string(),
        software,
        implementation,
        formats: model.format.clone(),
        contacts,
        resource_count: resource_types(model).len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRow {
    pub mode: String,
    pub resource_type: String,
    pub profile: Option<String>,
    pub interactions: Vec<String>,
    pub search_params: usize,
    pub operations: usize,
}

/// Every resource of every REST block, ordered by mode then type.
pub fn resource_rows(model: &CapabilityModel) -> Vec<ResourceRow> {
    let mut rows: Vec<ResourceRow> = model
        .rest
        .iter()
        .flat_map(|rest| {
            let mode = rest.mode.clone().unwrap_or_else(|| "server".to_string());
            rest.resource.iter().map(move |resource| ResourceRow {
                mode: mode.clone(),
                resource_type: resource.resource_type.clone(),
                profile: resource.profile.clone(),
                interactions: sort_interactions(resource.interaction.iter().map(|i| i.code.as_str())),
                search_params: resource.search_param.len(),
                operations: resource.operation.len(),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.mode
            .cmp(&b.mode)
            .then_with(|| a.resource_type.cmp(&b.resource_type))
    });
    rows
}

/// Distinct resource types across all REST blocks, sorted.
pub fn resource_types(model: &CapabilityModel) -> BTreeSet<&str> {
    model
        .rest
        .iter()
        .flat_map(|rest| rest.resource.iter())
        .map(|resource| resource.resource_type.as_str())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionMatrix {
    /// Column headers.
    pub codes: Vec<String>,
    /// One row per resource type; `supported[i]` matches `codes[i]`.
    pub rows: Vec<InteractionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRow {
    pub resource_type: String,
    pub supported: Vec<bool>,
}

/// Resource-level interaction support. A type declared in several REST blocks
/// gets the union of its interactions.
pub fn interaction_matrix(model: &CapabilityModel) -> InteractionMatrix {
    let mut by_type: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for resource in model.rest.iter().flat_map(|rest| rest.resource.iter()) {
        by_type
            .entry(resource.resource_type.as_str())
            .or_default()
            .extend(resource.interaction.iter().map(|i| i.code.as_str()));
    }

    let codes = sort_interactions(by_type.values().flatten().copied());
    let rows = by_type
        .into_iter()
        .map(|(resource_type, supported)| InteractionRow {
            resource_type: resource_type.to_string(),
            supported: codes.iter().map(|c| supported.contains(c.as_str())).collect(),
        })
        .collect();

    InteractionMatrix { codes, rows }
}

/// Deduplicate codes: known codes in specification order, then the rest
/// alphabetically.
fn sort_interactions<'a>(codes: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let distinct: BTreeSet<&str> = codes.into_iter().collect();
    let mut known: Vec<&str> = INTERACTION_ORDER
        .iter()
        .copied()
        .filter(|code| distinct.contains(code))
        .collect();
    known.extend(
        distinct
            .iter()
            .copied()
            .filter(|code| !INTERACTION_ORDER.contains(code)),
    );
    known.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationGroup {
    pub scope: Scope,
    pub operations: Vec<Operation>,
}

/// System-level operations first, then resource operations by type.
pub fn operation_groups(model: &CapabilityModel) -> Vec<OperationGroup> {
    let mut groups: BTreeMap<Scope, Vec<Operation>> = BTreeMap::new();
    for rest in &model.rest {
        if !rest.operation.is_empty() {
            groups
                .entry(Scope::System)
                .or_default()
                .extend(rest.operation.iter().cloned());
        }
        for resource in rest.resource.iter().filter(|r| !r.operation.is_empty()) {
            groups
                .entry(Scope::Resource(resource.resource_type.clone()))
                .or_default()
                .extend(resource.operation.iter().cloned());
        }
    }

    groups
        .into_iter()
        .map(|(scope, operations)| OperationGroup { scope, operations })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchGroup {
    pub scope: Scope,
    pub params: Vec<SearchParam>,
}

/// Search parameters grouped like [`operation_groups`], each group sorted by name.
pub fn search_groups(model: &CapabilityModel) -> Vec<SearchGroup> {
    let mut groups: BTreeMap<Scope, Vec<SearchParam>> = BTreeMap::new();
    for rest in &model.rest {
        if !rest.search_param.is_empty() {
            groups
                .entry(Scope::System)
                .or_default()
                .extend(rest.search_param.iter().cloned());
        }
        for resource in rest.resource.iter().filter(|r| !r.search_param.is_empty()) {
            groups
                .entry(Scope::Resource(resource.resource_type.clone()))
                .or_default()
                .extend(resource.search_param.iter().cloned());
        }
    }

    groups
        .into_iter()
        .map(|(scope, mut params)| {
            params.sort_by(|a, b| a.name.cmp(&b.name));
            SearchGroup { scope, params }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecuritySummary {
    pub mode: String,
    pub cors: Option<bool>,
    pub services: Vec<String>,
    pub description: Option<String>,
}

/// One entry per REST block that declares a security section.
pub fn security_summaries(model: &CapabilityModel) -> Vec<SecuritySummary> {
    model
        .rest
        .iter()
        .filter_map(|rest| {
            let security = rest.security.as_ref()?;
            Some(SecuritySummary {
                mode: rest.mode.clone().unwrap_or_else(|| "server".to_string()),
                cors: security.cors,
                services: security
                    .service
                    .iter()
                    .filter_map(|s| s.label().map(str::to_string))
                    .collect(),
                description: security.description.clone(),
            })
        })
        .collect()
}
