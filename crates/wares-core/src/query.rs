//! List filtering and offset pagination
//!
//! Filtering happens before counting, so `total` always reflects the
//! filtered set, not the page.

use crate::models::{Item, ItemPage};
use serde::Deserialize;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

/// Query-string parameters for the item listing.
///
/// Absent or zero `page`/`limit` fall back to 1/10.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn page(&self) -> u32 {
        match self.page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        }
    }

    pub fn limit(&self) -> u32 {
        match self.limit {
            Some(l) if l >= 1 => l,
            _ => DEFAULT_LIMIT,
        }
    }
}

/// Filter by case-insensitive substring on `name`, then slice out one page.
pub fn filter_and_paginate(items: Vec<Item>, query: &ListQuery) -> ItemPage {
    let filtered: Vec<Item> = match query.q.as_deref() {
        Some(q) if !q.is_empty() => {
            let needle = q.to_lowercase();
            items
                .into_iter()
                .filter(|item| item.name.to_lowercase().contains(&needle))
                .collect()
        }
        _ => items,
    };

    let page = query.page();
    let limit = query.limit();
    let total = filtered.len();

    let start = ((page - 1) as usize).saturating_mul(limit as usize);
    let page_items: Vec<Item> = filtered
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    ItemPage {
        items: page_items,
        total,
        page,
        page_size: limit,
    }
}
