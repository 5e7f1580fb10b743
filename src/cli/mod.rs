//! Terminal rendering of a loaded CapabilityStatement, one view per tab.

use clap::ValueEnum;

use crate::error::{LoadFailure, Result};
use crate::model::{
    CapabilityStatement, interaction_matrix, operation_groups, overview, resource_rows,
    search_groups, security_summaries,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Overview,
    Resources,
    Interactions,
    Operations,
    Search,
    Security,
    Raw,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Resources => "Resources",
            View::Interactions => "Interactions",
            View::Operations => "Operations",
            View::Search => "Search Parameters",
            View::Security => "Security",
            View::Raw => "Raw JSON",
        }
    }
}

pub fn render(view: View, doc: &CapabilityStatement) -> Result<String> {
    if view == View::Raw {
        return Ok(serde_json::to_string_pretty(doc.raw())?);
    }

    let mut lines = vec![view.title().to_string(), "=".repeat(view.title().len())];
    match view {
        View::Overview => render_overview(doc, &mut lines),
        View::Resources => render_resources(doc, &mut lines),
        View::Interactions => render_interactions(doc, &mut lines),
        View::Operations => render_operations(doc, &mut lines),
        View::Search => render_search(doc, &mut lines),
        View::Security => render_security(doc, &mut lines),
        View::Raw => {}
    }
    Ok(lines.join("\n"))
}

pub fn render_failure(failure: &LoadFailure) -> String {
    let mut out = format!("❌ {}\n{}", failure.kind, failure.message);
    if let Some(status) = &failure.status {
        out.push_str(&format!("\nHTTP status: {status}"));
    }
    out
}

fn field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        lines.push(format!("{:<16}{value}", format!("{label}:")));
    }
}

fn render_overview(doc: &CapabilityStatement, lines: &mut Vec<String>) {
    let overview = overview(doc);
    field(lines, "Name", overview.name.as_deref());
    field(lines, "Status", overview.status.as_deref());
    field(lines, "Date", overview.date.as_deref());
    field(lines, "Publisher", overview.publisher.as_deref());
    field(lines, "Kind", overview.kind.as_deref());
    field(lines, "FHIR version", Some(overview.fhir_version.as_str()));
    field(lines, "Software", overview.software.as_deref());
    field(lines, "Implementation", overview.implementation.as_deref());
    if !overview.formats.is_empty() {
        field(lines, "Formats", Some(overview.formats.join(", ").as_str()));
    }
    field(lines, "Resources", Some(overview.resource_count.to_string().as_str()));
    for contact in &overview.contacts {
        field(lines, "Contact", Some(contact.as_str()));
    }
}

fn render_resources(doc: &CapabilityStatement, lines: &mut Vec<String>) {
    let rows = resource_rows(doc.model());
    if rows.is_empty() {
        lines.push("No resources declared.".to_string());
        return;
    }

    let width = rows.iter().map(|r| r.resource_type.len()).max().unwrap_or(0);
    let mut mode = None;
    for row in &rows {
        if mode != Some(&row.mode) {
            lines.push(format!("[{}]", row.mode));
            mode = Some(&row.mode);
        }
        lines.push(format!(
            "  {:<width$}  {} search params, {} operations",
            row.resource_type, row.search_params, row.operations
        ));
        if !row.interactions.is_empty() {
            lines.push(format!("  {:<width$}  {}", "", row.interactions.join(", ")));
        }
        if let Some(profile) = &row.profile {
            lines.push(format!("  {:<width$}  profile: {profile}", ""));
        }
    }
}

fn render_interactions(doc: &CapabilityStatement, lines: &mut Vec<String>) {
    let matrix = interaction_matrix(doc.model());
    if matrix.rows.is_empty() {
        lines.push("No resource interactions declared.".to_string());
        return;
    }

    let width = matrix
        .rows
        .iter()
        .map(|r| r.resource_type.len())
        .max()
        .unwrap_or(0);

    for (index, code) in matrix.codes.iter().enumerate() {
        lines.push(format!("  {:<width$}  {}{code}", "", "| ".repeat(index)));
    }
    for row in &matrix.rows {
        let marks: Vec<&str> = row
            .supported
            .iter()
            .map(|supported| if *supported { "✓" } else { "·" })
            .collect();
        lines.push(format!("  {:<width$}  {}", row.resource_type, marks.join(" ")));
    }
}

fn render_operations(doc: &CapabilityStatement, lines: &mut Vec<String>) {
    let groups = operation_groups(doc.model());
    if groups.is_empty() {
        lines.push("No operations declared.".to_string());
        return;
    }

    for group in groups {
        lines.push(group.scope.to_string());
        for operation in &group.operations {
            match &operation.definition {
                Some(definition) => lines.push(format!("  ${}  {definition}", operation.name)),
                None => lines.push(format!("  ${}", operation.name)),
            }
        }
    }
}

fn render_search(doc: &CapabilityStatement, lines: &mut Vec<String>) {
    let groups = search_groups(doc.model());
    if groups.is_empty() {
        lines.push("No search parameters declared.".to_string());
        return;
    }

    for group in groups {
        lines.push(format!("{} ({})", group.scope, group.params.len()));
        for param in &group.params {
            let kind = param.param_type.as_deref().unwrap_or("unknown");
            lines.push(format!("  {} [{kind}]", param.name));
            if let Some(text) = &param.documentation {
                lines.push(format!("      {text}"));
            }
        }
    }
}

fn render_security(doc: &CapabilityStatement, lines: &mut Vec<String>) {
    let summaries = security_summaries(doc.model());
    if summaries.is_empty() {
        lines.push("No security information declared.".to_string());
        return;
    }

    for summary in summaries {
        lines.push(format!("[{}]", summary.mode));
        let cors = match summary.cors {
            Some(true) => "enabled",
            Some(false) => "disabled",
            None => "not stated",
        };
        field(lines, "CORS", Some(cors));
        if !summary.services.is_empty() {
            field(lines, "Services", Some(summary.services.join(", ").as_str()));
        }
        field(lines, "Description", summary.description.as_deref());
    }
}
