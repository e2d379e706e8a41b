//! Orders: boxes aggregated against a target value.

use super::{Item, ItemContainer};
use crate::core::store::{load_json, save_json, KeyValueStore};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A target-value order filled box by box.
///
/// `remaining_value` starts at the target and drops by a box's total at the
/// moment the box is added. That decrement is a one-off snapshot: changing a
/// box afterwards (through [`ValueOrder::container_mut`]) does not touch the
/// ledger.
///
/// Persistence is a lossy checkpoint. A saved summary keeps the
/// target, the remaining value and the box ids, but not box contents, so an
/// order rebuilt with [`ValueOrder::from_summary`] has the right numbers and
/// *no* containers. Duplicate checks against boxes from before the checkpoint
/// are therefore impossible after a reload.
#[derive(Debug, Clone)]
pub struct ValueOrder {
    target_value: f64,
    remaining_value: f64,
    containers: Vec<ItemContainer>,
    archived_ids: Vec<String>,
}

/// Flat persisted form of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub target_value: f64,
    pub remaining_value: f64,
    #[serde(default, alias = "boxes")]
    pub container_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl ValueOrder {
    pub fn new(target_value: f64) -> Self {
        Self {
            target_value,
            remaining_value: target_value,
            containers: Vec::new(),
            archived_ids: Vec::new(),
        }
    }

    pub fn target_value(&self) -> f64 {
        self.target_value
    }

    pub fn remaining_value(&self) -> f64 {
        self.remaining_value
    }

    /// Boxes added since this order was created or loaded
    pub fn containers(&self) -> &[ItemContainer] {
        &self.containers
    }

    /// Mutable access to an added box. The ledger is not adjusted.
    pub fn container_mut(&mut self, index: usize) -> Option<&mut ItemContainer> {
        self.containers.get_mut(index)
    }

    /// Every box this order knows of, archived ones included
    pub fn box_count(&self) -> usize {
        self.archived_ids.len() + self.containers.len()
    }

    /// Ids of boxes recorded in the summary this order was loaded from
    pub fn archived_container_ids(&self) -> &[String] {
        &self.archived_ids
    }

    /// Add a box and charge its current total against the remaining value
    pub fn add_box(&mut self, container: ItemContainer) {
        self.remaining_value -= container.total_value();
        self.containers.push(container);
    }

    /// Whether any box in this order already holds an item with this identity
    pub fn is_duplicate(&self, item: &Item) -> bool {
        self.containers.iter().any(|container| container.contains(item))
    }

    /// The target has been reached (or overshot)
    pub fn is_target_met(&self) -> bool {
        self.remaining_value <= 0.0
    }

    /// Flat summary: target, remaining value and every known box id
    pub fn save_summary(&self) -> OrderSummary {
        OrderSummary {
            target_value: self.target_value,
            remaining_value: self.remaining_value,
            container_ids: self
                .archived_ids
                .iter()
                .cloned()
                .chain(self.containers.iter().map(|c| c.id().to_string()))
                .collect(),
            saved_at: None,
        }
    }

    /// Rebuild the numeric ledger from a summary. Containers are not restored.
    pub fn from_summary(summary: OrderSummary) -> Self {
        Self {
            target_value: summary.target_value,
            remaining_value: summary.remaining_value,
            containers: Vec::new(),
            archived_ids: summary.container_ids,
        }
    }

    /// Save a timestamped summary under `key`
    pub fn persist(&self, store: &dyn KeyValueStore, key: &str) -> Result<OrderSummary, StoreError> {
        let summary = OrderSummary {
            saved_at: Some(Utc::now()),
            ..self.save_summary()
        };
        save_json(store, key, &summary)?;
        Ok(summary)
    }

    /// Start a fresh order under `key`.
    ///
    /// Fails with `AlreadyExists` when a summary is stored there, unless
    /// `replace` is set.
    pub fn create(
        store: &dyn KeyValueStore,
        key: &str,
        target_value: f64,
        replace: bool,
    ) -> Result<(Self, OrderSummary), StoreError> {
        if !replace && store.contains(key)? {
            return Err(StoreError::AlreadyExists { key: key.to_string() });
        }
        let order = Self::new(target_value);
        let summary = order.persist(store, key)?;
        Ok((order, summary))
    }

    /// Load the summary under `key`; fails with `NotFound` when there is none
    pub fn load_summary(store: &dyn KeyValueStore, key: &str) -> Result<Self, StoreError> {
        let summary: OrderSummary = load_json(store, key)?;
        Ok(Self::from_summary(summary))
    }
}

impl fmt::Display for ValueOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order with {} boxes, target value: ${:.2}, remaining value: ${:.2}",
            self.box_count(),
            self.target_value,
            self.remaining_value
        )
    }
}
