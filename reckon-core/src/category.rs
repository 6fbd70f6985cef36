//! Expense/income category definitions.

use serde::{Deserialize, Serialize};

/// Broad direction of money movement for a category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryType {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "asset")]
    Asset,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "expense",
            CategoryType::Income => "income",
            CategoryType::Asset => "asset",
        }
    }
}

/// Whether spending in a category recurs at a fixed amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FixedOrVariable {
    #[serde(rename = "fixed")]
    Fixed,
    #[serde(rename = "variable")]
    Variable,
}

/// A user-defined category, referenced from transactions by `code`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique short identifier, e.g. "100"
    pub code: String,
    pub name: String,
    pub category_type: CategoryType,
    pub fixed: FixedOrVariable,
}

impl Category {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category_type: CategoryType,
        fixed: FixedOrVariable,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category_type,
            fixed,
        }
    }
}
