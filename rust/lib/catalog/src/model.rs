//! Product metadata record and its storage key layout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// KV key prefix for product records: `catalog:product:{id}`.
pub const PRODUCT_PREFIX: &str = "catalog:product:";

/// Build the storage key for a product id.
pub fn product_key(id: &str) -> String {
    format!("{}{}", PRODUCT_PREFIX, id)
}

/// Descriptive metadata for one catalog product.
///
/// Only `id` is required. Fields this struct does not name are kept in
/// `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub im_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Rank per category, e.g. `{"Toys & Games": 211836}`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sales_rank: BTreeMap<String, i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_bought: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_viewed: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bought_together: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_reviews: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_stars: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_stars: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProductMetadata {
    /// A record with only id and title set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            description: None,
            price: None,
            brand: None,
            im_url: None,
            categories: Vec::new(),
            sales_rank: BTreeMap::new(),
            also_bought: Vec::new(),
            also_viewed: Vec::new(),
            bought_together: Vec::new(),
            num_reviews: None,
            num_stars: None,
            avg_stars: None,
            extra: BTreeMap::new(),
        }
    }
}
