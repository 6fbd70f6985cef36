//! Merchant -> category cache learned from reconciliation.
//!
//! Entries are written only when a human confirms or corrects a category;
//! an AI suggestion alone never reaches the cache. Entries have no expiry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Case/whitespace-normalized merchant key mapped to a confirmed category code
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MerchantCache {
    entries: HashMap<String, String>,
}

impl MerchantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously confirmed category code. Never mutates.
    pub fn lookup(&self, merchant_key: &str) -> Option<&str> {
        self.entries.get(merchant_key).map(String::as_str)
    }

    /// Record the latest human decision for this merchant. Last one wins.
    pub fn learn(&mut self, merchant_key: impl Into<String>, category_code: impl Into<String>) {
        self.entries.insert(merchant_key.into(), category_code.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
