//! Location allow-list and event matching

use crate::error::ScheduleError;
use crate::provider::Event;

/// Fixed set of locations a schedule may be requested for
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRegistry {
    locations: Vec<String>,
}

impl LocationRegistry {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry: Vec<String> = Vec::new();
        for loc in locations {
            let loc = loc.as_ref().trim().to_lowercase();
            if !loc.is_empty() && !registry.contains(&loc) {
                registry.push(loc);
            }
        }
        Self { locations: registry }
    }

    /// Normalize a requested location, rejecting anything not in the registry
    pub fn validate(&self, location: &str) -> Result<String, ScheduleError> {
        let normalized = location.to_lowercase();
        if self.locations.contains(&normalized) {
            Ok(normalized)
        } else {
            Err(ScheduleError::UnknownLocation(location.to_string()))
        }
    }

    pub fn all(&self) -> &[String] {
        &self.locations
    }
}

/// Find the event whose name mentions `location`.
///
/// Matching is a case-insensitive substring test, so a name like
/// "East Antioch" also matches "antioch". When several events match, the
/// last one in provider order is returned.
pub fn find_event_by_location<'a>(
    events: &'a [Event],
    location: &str,
) -> Result<&'a Event, ScheduleError> {
    let needle = location.to_lowercase();
    events
        .iter()
        .rev()
        .find(|event| event.display_name.to_lowercase().contains(&needle))
        .ok_or_else(|| ScheduleError::LocationNotFound(location.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn event(name: &str, id: &str) -> Event {
        Event {
            display_name: name.to_string(),
            resource_uri: format!("https://api.calendly.com/scheduled_events/{}", id),
        }
    }

    fn events() -> Vec<Event> {
        vec![
            event("Nashville Supply Pickup", "E0"),
            event("Antioch Supply Pickup", "E1"),
            event("Staff Meeting", "E2"),
            event("ANTIOCH Late Pickup", "E3"),
        ]
    }

    #[test_case("nashville", "E0" ; "single match")]
    #[test_case("antioch", "E3" ; "last of several matches")]
    #[test_case("staff", "E2" ; "case insensitive")]
    #[test_case("pickup", "E3" ; "substring shared by many")]
    fn test_find_event_by_location(location: &str, expected: &str) {
        let events = events();
        let found = find_event_by_location(&events, location).unwrap();
        assert_eq!(found.id().unwrap(), expected);
    }

    #[test]
    fn test_find_event_uppercase_target() {
        let events = events();
        let found = find_event_by_location(&events, "NASHVILLE").unwrap();
        assert_eq!(found.id().unwrap(), "E0");
    }

    #[test]
    fn test_find_event_no_match() {
        let events = events();
        assert_eq!(
            find_event_by_location(&events, "memphis"),
            Err(ScheduleError::LocationNotFound("memphis".to_string()))
        );
    }

    #[test]
    fn test_find_event_empty_collection() {
        assert!(matches!(
            find_event_by_location(&[], "antioch"),
            Err(ScheduleError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_registry_normalizes_entries() {
        let registry = LocationRegistry::new([" Nashville ", "antioch", ""]);
        assert_eq!(registry.all(), &["nashville".to_string(), "antioch".to_string()]);
    }

    #[test]
    fn test_registry_drops_repeats_in_first_seen_order() {
        let registry = LocationRegistry::new(["antioch", "nashville", "Antioch", " NASHVILLE "]);
        assert_eq!(registry.all(), &["antioch".to_string(), "nashville".to_string()]);
    }

    #[test_case("antioch" ; "lowercase")]
    #[test_case("Antioch" ; "capitalized")]
    #[test_case("NASHVILLE" ; "uppercase")]
    fn test_registry_accepts_known(location: &str) {
        let registry = LocationRegistry::new(["nashville", "antioch"]);
        assert_eq!(registry.validate(location), Ok(location.to_lowercase()));
    }

    #[test]
    fn test_registry_rejects_unknown() {
        let registry = LocationRegistry::new(["nashville", "antioch"]);
        assert_eq!(
            registry.validate("Memphis"),
            Err(ScheduleError::UnknownLocation("Memphis".to_string()))
        );
    }
}
