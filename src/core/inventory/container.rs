//! Boxes of items.

use super::Item;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A box: an ordered collection of distinct items.
///
/// Insertion order is kept and removal is last-in-first-out. No two items
/// share an identity string; every insertion checks the whole box, which is
/// fine for the few dozen slabs a box holds. The total value is derived from
/// the items each time it is asked for.
///
/// Deserializing goes through [`ItemContainer::add_item`], so a record that
/// repeats an identity is rejected instead of loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContainerRecord")]
pub struct ItemContainer {
    id: String,
    items: Vec<Item>,
}

/// Unchecked wire form of a box
#[derive(Deserialize)]
struct ContainerRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    items: Vec<Item>,
}

impl TryFrom<ContainerRecord> for ItemContainer {
    type Error = String;

    fn try_from(record: ContainerRecord) -> Result<Self, Self::Error> {
        let mut container = ItemContainer::new(record.id);
        for item in record.items {
            let identity = item.identity().to_string();
            if !container.add_item(item) {
                return Err(format!("duplicate item '{}' in box '{}'", identity, container.id));
            }
        }
        Ok(container)
    }
}

impl ItemContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
        }
    }

    /// Box with a short random id, for when the operator did not label one
    pub fn with_generated_id() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self::new(&id[..8])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item with the same identity is already in the box
    pub fn contains(&self, item: &Item) -> bool {
        self.items.iter().any(|existing| existing.is_same_as(item))
    }

    /// Append `item` unless it duplicates one already boxed.
    ///
    /// Returns `false`, leaving the box untouched, for a duplicate.
    pub fn add_item(&mut self, item: Item) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Take out the most recently added item
    pub fn remove_last_item(&mut self) -> Option<Item> {
        self.items.pop()
    }

    /// Sum of item values, missing values counting as zero
    pub fn total_value(&self) -> f64 {
        self.items.iter().map(Item::value_or_zero).sum()
    }

    pub fn report(&self) -> ContainerReport {
        ContainerReport {
            id: self.id.clone(),
            items: self.items.clone(),
            total_value: self.total_value(),
        }
    }
}

/// Serializable snapshot of a box and its total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerReport {
    pub id: String,
    pub items: Vec<Item>,
    pub total_value: f64,
}
