use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::records::{Collection, Item, Order, OrderId, Trip};
use crate::{AppError, ErrorKind};

// At most one live subscription filter per collection kind; re-subscribing
// replaces the previous filter rather than stacking a second one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    active: HashMap<Collection, Option<String>>,
}

impl SubscriptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an existing subscription was replaced.
    pub fn subscribe(&mut self, collection: Collection, filter: Option<String>) -> bool {
        self.active.insert(collection, filter).is_some()
    }

    /// Tears down one collection's subscription, or all of them.
    /// Returns the collections that were actually active.
    pub fn unsubscribe(&mut self, collection: Option<Collection>) -> Vec<Collection> {
        match collection {
            Some(kind) => {
                if self.active.remove(&kind).is_some() {
                    vec![kind]
                } else {
                    Vec::new()
                }
            }
            None => {
                let mut torn_down: Vec<Collection> = self.active.drain().map(|(k, _)| k).collect();
                torn_down.sort_by_key(|collection| collection.name());
                torn_down
            }
        }
    }

    #[must_use]
    pub fn is_subscribed(&self, collection: Collection) -> bool {
        self.active.contains_key(&collection)
    }

    #[must_use]
    pub fn active_filter(&self, collection: Collection) -> Option<&str> {
        self.active.get(&collection).and_then(|f| f.as_deref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

pub fn parse_records<T: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<T>, AppError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|e| {
                AppError::new(ErrorKind::Deserialization, "Malformed record from backend")
                    .with_internal(e.to_string())
            })
        })
        .collect()
}

// Upsert by partition: replace only the items belonging to this order,
// leaving other orders' items alone so concurrent loads can't clobber
// each other.
pub fn upsert_order_items(items: &mut Vec<Item>, order_id: &OrderId, fresh: Vec<Item>) {
    items.retain(|item| &item.order_id != order_id);
    items.extend(fresh);
}

// Shopping view grouping: every item lands under its order's user_name,
// groups appear in the orders' listing order (first occurrence wins) and
// orders sharing a name merge into one group.
#[must_use]
pub fn group_items_by_user(items: &[Item], orders: &[Order]) -> IndexMap<String, Vec<Item>> {
    let mut groups: IndexMap<String, Vec<Item>> = IndexMap::new();

    for order in orders {
        let order_items = items.iter().filter(|item| item.order_id == order.id);
        for item in order_items {
            groups
                .entry(order.user_name.clone())
                .or_default()
                .push(item.clone());
        }
    }

    groups
}

pub fn sort_trips_newest_first(trips: &mut [Trip]) {
    trips.sort_by(|a, b| b.created_at_ms_utc.cmp(&a.created_at_ms_utc));
}

pub fn sort_trips_recently_updated_first(trips: &mut [Trip]) {
    trips.sort_by(|a, b| b.updated_at_ms_utc.cmp(&a.updated_at_ms_utc));
}

pub fn sort_orders_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at_ms_utc.cmp(&a.created_at_ms_utc));
}

pub fn sort_items_oldest_first(items: &mut [Item]) {
    items.sort_by(|a, b| a.created_at_ms_utc.cmp(&b.created_at_ms_utc));
}
