//! Transaction records and the reconciliation state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::merchant::merchant_key;

/// Lifecycle of an imported transaction.
///
/// Pending -> Suggested -> Reconciled, never backwards. Reconciled is
/// terminal; fixing a confirmed category would need a reopen operation,
/// which is deliberately not offered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "suggested")]
    Suggested,
    #[serde(rename = "reconciled")]
    Reconciled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Suggested => "suggested",
            TransactionStatus::Reconciled => "reconciled",
        }
    }
}

/// Where the current category suggestion came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SuggestedBy {
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "none")]
    None,
}

impl SuggestedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedBy::Cache => "cache",
            SuggestedBy::Ai => "ai",
            SuggestedBy::None => "none",
        }
    }
}

/// A statement row parsed from CSV, before it is assigned an id
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    /// Positive = income, negative = expense
    pub amount: f64,
    pub description: String,
    pub merchant_key: String,
}

impl TransactionDraft {
    pub fn new(date: NaiveDate, amount: f64, description: impl Into<String>) -> Self {
        let description = description.into();
        let merchant_key = merchant_key(&description);
        Self {
            date,
            amount,
            description,
            merchant_key,
        }
    }
}

/// An imported transaction, owned by the transaction store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Opaque unique id, assigned at import and stable for life
    pub id: String,
    pub date: NaiveDate,
    /// Positive = income, negative = expense
    pub amount: f64,
    /// Raw statement description
    pub description: String,
    /// Normalized description used for merchant-cache lookups
    pub merchant_key: String,
    pub category_code: Option<String>,
    pub suggested_by: SuggestedBy,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Promote a parsed draft into a stored transaction. Starts Pending with
    /// no category; categorization moves it to Suggested.
    pub fn from_draft(id: impl Into<String>, draft: TransactionDraft) -> Self {
        Self {
            id: id.into(),
            date: draft.date,
            amount: draft.amount,
            description: draft.description,
            merchant_key: draft.merchant_key,
            category_code: None,
            suggested_by: SuggestedBy::None,
            status: TransactionStatus::Pending,
        }
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}
