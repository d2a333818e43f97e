//! Prefilled WhatsApp message rendering.
//!
//! The output is embedded verbatim in the outbound deep link, so the
//! template below is part of the external contract.

use crate::domain::{FunnelData, Service};

/// Fields consumed by [`format_message`], borrowed from the funnel record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageFields<'a> {
    pub service: &'a str,
    pub year: Option<&'a str>,
    pub make: Option<&'a str>,
    pub model: Option<&'a str>,
    pub package: Option<&'a str>,
    pub finish: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub condition: &'a str,
    pub timing: &'a str,
    pub name: Option<&'a str>,
    pub color_idea: Option<&'a str>,
}

impl<'a> From<&'a FunnelData> for MessageFields<'a> {
    fn from(data: &'a FunnelData) -> Self {
        Self {
            service: data.service_id(),
            year: data.year.as_deref(),
            make: data.make.as_deref(),
            model: data.model.as_deref(),
            package: data.package.as_deref(),
            finish: data.finish.as_deref(),
            brand: data.brand.as_deref(),
            condition: data.condition.as_deref().unwrap_or(""),
            timing: data.timing.as_deref().unwrap_or(""),
            name: data.name.as_deref(),
            color_idea: data.color_idea.as_deref(),
        }
    }
}

/// Renders the message text for a completed funnel.
pub fn format_message(fields: &MessageFields<'_>) -> String {
    let greeting = match filled(fields.name) {
        Some(name) => format!("Hi, I'm *{name}*!"),
        None => "Hi!".to_string(),
    };

    let mut details = format!(
        "• Car: *{car}*\n• Package: *{package}*\n• Condition: *{condition}*\n• Timeline: *{timing}*",
        car = vehicle_descriptor(fields),
        package = package_descriptor(fields),
        condition = fields.condition,
        timing = fields.timing,
    );
    if let Some(color) = fields.color_idea.map(str::trim).filter(|c| !c.is_empty()) {
        details.push_str(&format!("\n• Color Idea: *{color}*"));
    }

    format!(
        "{greeting}\n\nI'm interested in getting a *{service}* for my vehicle.\n\n*Vehicle Details:*\n{details}\n\nLooking forward to your quote!",
        service = service_display_name(fields.service),
    )
}

/// Package id followed by finish and brand, skipping empty parts.
pub fn package_descriptor(fields: &MessageFields<'_>) -> String {
    [fields.package, fields.finish, fields.brand]
        .into_iter()
        .filter_map(filled)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"{year} {make} {model}"` or `Not specified` when any part is missing.
pub fn vehicle_descriptor(fields: &MessageFields<'_>) -> String {
    match (filled(fields.year), filled(fields.make), filled(fields.model)) {
        (Some(year), Some(make), Some(model)) => format!("{year} {make} {model}"),
        _ => "Not specified".to_string(),
    }
}

/// Display name for a service id; unknown ids pass through untouched.
pub fn service_display_name(service: &str) -> &str {
    match Service::from_id(service) {
        Some(known) if known.id() == service => known.display_name(),
        _ => service,
    }
}

fn filled(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
