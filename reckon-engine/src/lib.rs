//! reckon-engine: merchant cache, batched AI categorization, JSON persistence,
//! and the reconciliation state machine.

pub mod cache;
pub mod engine;
pub mod provider;
pub mod reconcile;
pub mod report;
pub mod store;

pub use cache::MerchantCache;
pub use engine::{BatchOutcome, categorize_batch};
pub use provider::{AiError, AnthropicProvider, SuggestionProvider, UnconfiguredProvider};
pub use reconcile::{ReconcileAllOutcome, ReconcileError, reconcile_all, reconcile_one};
pub use report::{CategoryTotal, ReportKind, report_by_category};
pub use store::{JsonStore, StoreError};
