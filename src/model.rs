//! The declarative shop model and the builders that produce it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::condition::Condition;

/// An item offered by a shop, with the conjunction of conditions active
/// where it was registered, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub items: Vec<Item>,
}

/// Every recognized shop, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    shops: BTreeMap<i64, Shop>,
}

impl Model {
    pub fn get(&self, id: i64) -> Option<&Shop> {
        self.shops.get(&id)
    }

    pub fn shops(&self) -> impl Iterator<Item = &Shop> {
        self.shops.values()
    }

    pub fn shop_ids(&self) -> Vec<i64> {
        self.shops.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    /// Total items across all shops.
    pub fn item_count(&self) -> usize {
        self.shops.values().map(|s| s.items.len()).sum()
    }

    /// SHA-256 hex digest of the canonical JSON encoding.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        // Maps keyed by integers cannot fail to serialize.
        if let Ok(bytes) = serde_json::to_vec(self) {
            hasher.update(&bytes);
        }
        let hash = hasher.finalize();
        format!("{:x}", hash)
    }
}

/// Items in progress for one shop.
#[derive(Debug)]
pub struct ShopBuilder {
    id: i64,
    items: Vec<Item>,
}

impl ShopBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Register an item under a snapshot of `conditions`.
    pub fn add_item(&mut self, id: i64, conditions: &[Condition]) {
        self.items.push(Item {
            id,
            conditions: conditions.to_vec(),
        });
    }

    pub fn freeze(self) -> Shop {
        Shop {
            id: self.id,
            items: self.items,
        }
    }
}

#[derive(Debug, Default)]
pub struct ModelBuilder {
    shops: BTreeMap<i64, Shop>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished shop. A shop whose id is already present is rejected
    /// and handed back; the first one stays.
    pub fn add_shop(&mut self, shop: Shop) -> Result<(), Shop> {
        if self.shops.contains_key(&shop.id) {
            return Err(shop);
        }
        self.shops.insert(shop.id, shop);
        Ok(())
    }

    pub fn freeze(self) -> Model {
        Model { shops: self.shops }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionTag;

    fn sample() -> Model {
        let mut shop = ShopBuilder::new(3);
        shop.add_item(10, &[]);
        shop.add_item(11, &[Condition::new(ConditionTag::Hardmode)]);
        let mut builder = ModelBuilder::new();
        builder.add_shop(shop.freeze()).unwrap();
        builder.add_shop(ShopBuilder::new(1).freeze()).unwrap();
        builder.freeze()
    }

    #[test]
    fn shops_are_ordered_by_id() {
        let model = sample();
        assert_eq!(model.shop_ids(), vec![1, 3]);
        assert_eq!(model.len(), 2);
        assert_eq!(model.item_count(), 2);
        assert!(!model.is_empty());
        assert!(model.get(2).is_none());
        assert_eq!(model.get(3).unwrap().items[1].conditions.len(), 1);
    }

    #[test]
    fn builder_snapshots_conditions() {
        let mut stack = vec![Condition::new(ConditionTag::TimeDay)];
        let mut shop = ShopBuilder::new(1);
        shop.add_item(5, &stack);
        stack.clear();
        assert_eq!(shop.id(), 1);
        assert_eq!(shop.freeze().items[0].conditions.len(), 1);
    }

    #[test]
    fn duplicate_shop_keeps_first() {
        let mut first = ShopBuilder::new(7);
        first.add_item(1, &[]);
        let mut second = ShopBuilder::new(7);
        second.add_item(2, &[]);

        let mut builder = ModelBuilder::new();
        assert!(builder.add_shop(first.freeze()).is_ok());
        let rejected = builder.add_shop(second.freeze()).unwrap_err();
        assert_eq!(rejected.items[0].id, 2);
        assert_eq!(builder.freeze().get(7).unwrap().items[0].id, 1);
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        assert_eq!(sample().digest(), sample().digest());
        assert_eq!(sample().digest().len(), 64);
        assert_ne!(sample().digest(), Model::default().digest());
    }

    #[test]
    fn json_round_trip() {
        let model = sample();
        let json = serde_json::to_string(&model).unwrap();
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
