//! Domain and wire models
//!
//! Wire shapes mirror the HTTP API: multi-word fields are camelCase,
//! tolerant fields carry `#[serde(default)]` so sparse records still load.

use serde::{Deserialize, Serialize};

/// A catalog item as stored in the dataset file.
///
/// Identity is `id`, assigned once at creation. A missing `price` in the
/// stored JSON deserializes to 0 rather than rejecting the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
}

/// Payload for item creation; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
}

impl NewItem {
    /// Materialize into an [`Item`] with an assigned id.
    pub fn into_item(self, id: i64) -> Item {
        Item {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
        }
    }
}

/// One page of a filtered item listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
}

impl ItemPage {
    /// Whether pages beyond this one exist, from the echoed page/pageSize.
    pub fn has_more(&self) -> bool {
        (self.page as usize) * (self.page_size as usize) < self.total
    }
}

/// Aggregate statistics over the whole dataset.
///
/// Immutable once produced; recomputed wholesale, never incrementally.
/// Serialized as `{"total": .., "averagePrice": ..}` to match the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(rename = "total")]
    pub count: usize,
    pub average_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_price_defaults_to_zero() {
        let item: Item = serde_json::from_str(r#"{"id": 1, "name": "Lamp"}"#).unwrap();
        assert_eq!(item.price, 0.0);
        assert_eq!(item.category, "");
    }

    #[test]
    fn test_stats_wire_shape() {
        let snap = StatsSnapshot {
            count: 3,
            average_price: 12.5,
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["averagePrice"], 12.5);
    }

    #[test]
    fn test_page_has_more() {
        let page = ItemPage {
            items: vec![],
            total: 25,
            page: 1,
            page_size: 10,
        };
        assert!(page.has_more());

        let last = ItemPage {
            items: vec![],
            total: 25,
            page: 3,
            page_size: 10,
        };
        assert!(!last.has_more());
    }
}
