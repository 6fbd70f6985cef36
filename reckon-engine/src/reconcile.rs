//! Reconciliation: the human confirms or corrects suggested categories.
//!
//! Every successful reconciliation also writes the merchant cache, so cache
//! entries always reflect the latest human decision. Confirmation and
//! correction are the same operation.

use thiserror::Error;
use tracing::debug;

use reckon_core::TransactionStatus;

use crate::store::{JsonStore, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("transaction {0} not found")]
    NotFound(String),
    #[error("transaction {id} is {}, only suggested transactions can be reconciled", .status.as_str())]
    InvalidState {
        id: String,
        status: TransactionStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a bulk reconcile pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileAllOutcome {
    pub reconciled: usize,
    /// Suggested transactions skipped because they carry no category
    pub skipped: usize,
}

/// Reconcile one transaction with the chosen category code.
///
/// Transactions and the merchant cache update as a single unit; on a
/// persistence failure the in-memory store is reloaded from disk so
/// nothing half-applies.
pub fn reconcile_one(
    store: &mut JsonStore,
    id: &str,
    category_code: &str,
) -> Result<(), ReconcileError> {
    let idx = store
        .transactions()
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| ReconcileError::NotFound(id.to_string()))?;

    let status = store.transactions()[idx].status;
    if status != TransactionStatus::Suggested {
        return Err(ReconcileError::InvalidState {
            id: id.to_string(),
            status,
        });
    }

    let merchant_key = store.transactions()[idx].merchant_key.clone();

    let t = &mut store.transactions_mut()[idx];
    t.category_code = Some(category_code.to_string());
    t.status = TransactionStatus::Reconciled;
    store.cache_mut().learn(merchant_key, category_code);

    if let Err(err) = store.save_transactions_and_cache() {
        store.reload()?;
        return Err(err.into());
    }

    debug!(id, category_code, "reconciled transaction");
    Ok(())
}

/// Reconcile every suggested transaction using its current suggestion.
/// Transactions without a suggestion are skipped and counted, not failed.
pub fn reconcile_all(store: &mut JsonStore) -> Result<ReconcileAllOutcome, ReconcileError> {
    let mut outcome = ReconcileAllOutcome::default();

    let mut targets: Vec<(String, String, String)> = Vec::new();
    for t in store.transactions() {
        if t.status != TransactionStatus::Suggested {
            continue;
        }
        match &t.category_code {
            Some(code) => targets.push((t.id.clone(), t.merchant_key.clone(), code.clone())),
            None => outcome.skipped += 1,
        }
    }

    for (id, merchant_key, code) in targets {
        if let Some(t) = store.transactions_mut().iter_mut().find(|t| t.id == id) {
            t.category_code = Some(code.clone());
            t.status = TransactionStatus::Reconciled;
        }
        store.cache_mut().learn(merchant_key, code);
        outcome.reconciled += 1;
    }

    if outcome.reconciled > 0 {
        if let Err(err) = store.save_transactions_and_cache() {
            store.reload()?;
            return Err(err.into());
        }
    }

    debug!(
        reconciled = outcome.reconciled,
        skipped = outcome.skipped,
        "bulk reconcile finished"
    );
    Ok(outcome)
}
