//! Gender classification of a match from its event metadata.
//!
//! Source documents carry no reliable gender field in the event section, so
//! the category is inferred. The default looks for `Women's` in the event name;
//! callers with better knowledge plug in their own [`GenderClassifier`].

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::Gender;

/// Decides the gender category of a match from its raw `event` mapping.
pub trait GenderClassifier: Send + Sync {
    fn classify(&self, event: &Map<String, Value>) -> Gender;
}

impl<F> GenderClassifier for F
where
    F: Fn(&Map<String, Value>) -> Gender + Send + Sync,
{
    fn classify(&self, event: &Map<String, Value>) -> Gender {
        self(event)
    }
}

/// The event name, or `""` when absent or not a string.
pub fn event_name(event: &Map<String, Value>) -> &str {
    event.get("name").and_then(Value::as_str).unwrap_or("")
}

/// `women` when the event name contains `Women's` (case-sensitive), else `men`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WomensEventName;

impl GenderClassifier for WomensEventName {
    fn classify(&self, event: &Map<String, Value>) -> Gender {
        if event_name(event).contains("Women's") {
            Gender::Women
        } else {
            Gender::Men
        }
    }
}

/// `women` when the event name matches a regular expression, else `men`.
#[derive(Debug, Clone)]
pub struct EventNamePattern {
    pattern: Regex,
}

impl EventNamePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl GenderClassifier for EventNamePattern {
    fn classify(&self, event: &Map<String, Value>) -> Gender {
        if self.pattern.is_match(event_name(event)) {
            Gender::Women
        } else {
            Gender::Men
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(name: &str) -> Map<String, Value> {
        json!({ "name": name }).as_object().unwrap().clone()
    }

    #[test]
    fn test_default_heuristic() {
        let c = WomensEventName;
        assert_eq!(c.classify(&event("ICC Women's T20 World Cup Asia Qualifier")), Gender::Women);
        assert_eq!(c.classify(&event("ICC Men's T20 World Cup")), Gender::Men);
        // case-sensitive
        assert_eq!(c.classify(&event("women's premier league")), Gender::Men);
        assert_eq!(c.classify(&Map::new()), Gender::Men);
    }

    #[test]
    fn test_pattern_classifier() {
        let c = EventNamePattern::new(r"(?i)\bwomen|\bWPL\b").unwrap();
        assert_eq!(c.classify(&event("women's premier league")), Gender::Women);
        assert_eq!(c.classify(&event("WPL 2024")), Gender::Women);
        assert_eq!(c.classify(&event("Indian Premier League")), Gender::Men);
    }

    #[test]
    fn test_closure_classifier() {
        let always_women = |_: &Map<String, Value>| Gender::Women;
        assert_eq!(always_women.classify(&Map::new()), Gender::Women);
    }

    #[test]
    fn test_non_string_name_is_empty() {
        let event = json!({ "name": 42 }).as_object().unwrap().clone();
        assert_eq!(event_name(&event), "");
    }
}
