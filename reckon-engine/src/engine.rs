//! Batch categorization: cache lookups first, then one provider call for
//! whatever is left.
//!
//! Exactly one provider request per import, no matter how many transactions
//! the batch holds. Merchants are deduplicated by key before the call, so
//! identical merchants share one suggestion.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use reckon_core::{Category, SuggestedBy, Transaction, TransactionDraft, TransactionStatus};

use crate::cache::MerchantCache;
use crate::provider::SuggestionProvider;

/// How an import batch was categorized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub from_cache: usize,
    pub from_ai: usize,
    pub unsuggested: usize,
    /// True when the single AI call was attempted and failed. The import
    /// still succeeds; only enrichment is skipped.
    pub ai_call_failed: bool,
}

/// Categorize a batch of drafts. Every output transaction ends Suggested,
/// with `category_code`/`suggested_by` recording what was found for it.
pub async fn categorize_batch<P: SuggestionProvider>(
    drafts: Vec<TransactionDraft>,
    categories: &[Category],
    cache: &MerchantCache,
    provider: &P,
) -> (Vec<Transaction>, BatchOutcome) {
    let mut txns: Vec<Transaction> = drafts
        .into_iter()
        .map(|d| Transaction::from_draft(Uuid::new_v4().to_string(), d))
        .collect();

    let mut outcome = BatchOutcome::default();

    // Distinct uncached merchants, in first-seen order, for the one AI call
    let mut unknown: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for t in &txns {
        if cache.lookup(&t.merchant_key).is_none() && seen.insert(t.merchant_key.clone()) {
            unknown.push(t.merchant_key.clone());
        }
    }

    let suggestions: HashMap<String, String> = if unknown.is_empty() {
        HashMap::new()
    } else {
        match provider.suggest(&unknown, categories).await {
            Ok(map) => map,
            Err(err) => {
                warn!(error = %err, merchants = unknown.len(),
                    "AI categorization failed; importing without suggestions");
                outcome.ai_call_failed = true;
                HashMap::new()
            }
        }
    };

    let valid_codes: HashSet<&str> = categories.iter().map(|c| c.code.as_str()).collect();

    for t in &mut txns {
        if let Some(code) = cache.lookup(&t.merchant_key) {
            t.category_code = Some(code.to_string());
            t.suggested_by = SuggestedBy::Cache;
        } else {
            // A code the provider invented counts as no suggestion
            let suggestion = suggestions
                .get(&t.merchant_key)
                .filter(|code| valid_codes.contains(code.as_str()));
            match suggestion {
                Some(code) => {
                    t.category_code = Some(code.clone());
                    t.suggested_by = SuggestedBy::Ai;
                }
                None => {
                    t.category_code = None;
                    t.suggested_by = SuggestedBy::None;
                }
            }
        }
        t.status = TransactionStatus::Suggested;

        match t.suggested_by {
            SuggestedBy::Cache => outcome.from_cache += 1,
            SuggestedBy::Ai => outcome.from_ai += 1,
            SuggestedBy::None => outcome.unsuggested += 1,
        }
    }

    debug!(
        total = txns.len(),
        cache = outcome.from_cache,
        ai = outcome.from_ai,
        unsuggested = outcome.unsuggested,
        "categorized import batch"
    );

    (txns, outcome)
}
