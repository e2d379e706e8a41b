//! Scanned items.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One physical object that came off the scanner.
///
/// The identity string is what duplicate detection compares: for graded
/// coins it is the certification barcode. `value` is the item's guide value
/// when one is known; a missing value counts as zero in every total.
/// Plugin-specific details (grading service, year, denomination) ride along
/// in `attributes` and are never interpreted by the accounting code.
///
/// Items are built once and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default)]
    item_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, Value>,
}

impl Item {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            value: None,
            item_type: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// The value used in totals
    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Same identity string
    pub fn is_same_as(&self, other: &Item) -> bool {
        self.identity == other.identity
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_counts_as_zero() {
        let item = Item::new("1111222233334444");
        assert_eq!(item.value(), None);
        assert_eq!(item.value_or_zero(), 0.0);
        assert_eq!(item.with_value(12.5).value_or_zero(), 12.5);
    }

    #[test]
    fn identity_drives_sameness_and_display() {
        let a = Item::new("A").with_value(1.0);
        let b = Item::new("A").with_value(99.0).with_type("coin");
        assert!(a.is_same_as(&b));
        assert_eq!(a.to_string(), "A");
        assert!(!a.is_same_as(&Item::new("B")));
    }

    #[test]
    fn attributes_serialize_alongside_identity() {
        let item = Item::new("4455")
            .with_type("coin")
            .with_attribute("grading_service", "NGC");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["identity"], "4455");
        assert_eq!(json["attributes"]["grading_service"], "NGC");
        assert!(json.get("value").is_none());
    }

    #[test]
    fn deserializes_minimal_record() {
        let item: Item = serde_json::from_str(r#"{"identity":"123"}"#).unwrap();
        assert_eq!(item.identity(), "123");
        assert_eq!(item.item_type(), "");
        assert!(item.attributes().is_empty());
    }
}
