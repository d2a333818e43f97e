use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FunnelError;

/// Top-level offering that decides which package fields apply downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Wrapping,
    Ppf,
    Detailing,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Wrapping, Service::Ppf, Service::Detailing];

    /// Stable identifier used in snapshots, analytics, and the catalog.
    pub fn id(self) -> &'static str {
        match self {
            Service::Wrapping => "wrapping",
            Service::Ppf => "ppf",
            Service::Detailing => "detailing",
        }
    }

    /// Human-readable name embedded in the outbound message.
    pub fn display_name(self) -> &'static str {
        match self {
            Service::Wrapping => "Vehicle Wrapping",
            Service::Ppf => "Paint Protection Film (PPF)",
            Service::Detailing => "Car Detailing",
        }
    }

    /// Short label and blurb shown on the service selection screen.
    pub fn card(self) -> (&'static str, &'static str) {
        match self {
            Service::Wrapping => ("Wrapping", "Full/partial wrap, color change, chrome delete"),
            Service::Ppf => ("Paint Protection Film (PPF)", "Full front / track pack / full body"),
            Service::Detailing => ("Detailing", "Interior / exterior / full, extras"),
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Service::ALL
            .into_iter()
            .find(|service| service.id() == id.trim())
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Service {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::from_id(s).ok_or_else(|| FunnelError::InvalidInput(format!("unknown service `{s}`")))
    }
}

/// Serde adapter storing an optional service as its id, with `""` for unset.
///
/// Unknown identifiers in a stored snapshot load as unset rather than failing
/// the whole snapshot.
pub(crate) mod optional_service_id {
    use super::*;

    pub fn serialize<S>(value: &Option<Service>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map(Service::id).unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Service>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Service::from_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_id() {
        for service in Service::ALL {
            assert_eq!(Service::from_id(service.id()), Some(service));
        }
        assert_eq!(Service::from_id("tinting"), None);
        assert_eq!(Service::from_id(""), None);
    }

    #[test]
    fn display_names_match_message_vocabulary() {
        assert_eq!(Service::Wrapping.display_name(), "Vehicle Wrapping");
        assert_eq!(Service::Ppf.display_name(), "Paint Protection Film (PPF)");
        assert_eq!(Service::Detailing.display_name(), "Car Detailing");
    }

    #[test]
    fn parse_rejects_unknown_ids() {
        assert!("ppf".parse::<Service>().is_ok());
        assert!(matches!(
            "ceramic".parse::<Service>(),
            Err(FunnelError::InvalidInput(_))
        ));
    }
}
