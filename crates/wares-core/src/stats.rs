//! Dataset statistics aggregation
//!
//! Pure computation over the full collection; the caching layer around it
//! lives in [`crate::cache`].

use crate::models::{Item, StatsSnapshot};

/// Compute aggregate statistics for a collection.
///
/// An empty collection yields `{count: 0, average_price: 0}`. Prices
/// missing from the stored records have already degraded to 0 at
/// deserialization, so the average never fails.
pub fn aggregate(items: &[Item]) -> StatsSnapshot {
    if items.is_empty() {
        return StatsSnapshot {
            count: 0,
            average_price: 0.0,
        };
    }

    let count = items.len();
    let total_price: f64 = items.iter().map(|item| item.price).sum();

    StatsSnapshot {
        count,
        average_price: round2(total_price / count as f64),
    }
}

/// Round to 2 decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
