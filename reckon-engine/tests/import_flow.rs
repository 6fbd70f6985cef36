//! End-to-end pipeline: statement CSV -> batch categorization -> store ->
//! reconciliation -> merchant cache -> re-import.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use reckon_core::{Category, CategoryType, FixedOrVariable, SuggestedBy, TransactionStatus};
use reckon_engine::{
    AiError, JsonStore, SuggestionProvider, categorize_batch, reconcile_all, reconcile_one,
    report_by_category, ReportKind,
};
use reckon_ingest::parse_statement_csv;

struct MapProvider {
    map: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MapProvider {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            map: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl SuggestionProvider for MapProvider {
    async fn suggest(
        &self,
        _merchants: &[String],
        _categories: &[Category],
    ) -> Result<HashMap<String, String>, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.map.clone())
    }
}

struct FailingProvider;

impl SuggestionProvider for FailingProvider {
    async fn suggest(
        &self,
        _merchants: &[String],
        _categories: &[Category],
    ) -> Result<HashMap<String, String>, AiError> {
        Err(AiError::MalformedResponse("truncated".to_string()))
    }
}

fn seed_categories(store: &mut JsonStore) {
    store
        .add_category(Category::new(
            "100",
            "Groceries",
            CategoryType::Expense,
            FixedOrVariable::Variable,
        ))
        .unwrap();
    store
        .add_category(Category::new(
            "1000",
            "Salary",
            CategoryType::Income,
            FixedOrVariable::Fixed,
        ))
        .unwrap();
}

const STATEMENT: &str = "02/01/2026,\"-52.63\",\"COLES 0645 OAKLEIGH 03\",\"\"\n";

#[tokio::test]
async fn test_import_reconcile_then_reimport_hits_cache() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonStore::open(dir.path()).unwrap();
    seed_categories(&mut store);

    // First import: no cache entry, AI maps the merchant to "100"
    let provider = MapProvider::new(&[("coles 0645 oakleigh 03", "100")]);
    let drafts = parse_statement_csv(STATEMENT).unwrap();
    let (txns, outcome) =
        categorize_batch(drafts, store.categories(), store.merchant_cache(), &provider).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(txns.len(), 1);
    let first_id = txns[0].id.clone();
    assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    assert_eq!(txns[0].amount, -52.63);
    assert_eq!(txns[0].category_code.as_deref(), Some("100"));
    assert_eq!(txns[0].suggested_by, SuggestedBy::Ai);
    assert_eq!(txns[0].status, TransactionStatus::Suggested);
    assert_eq!(outcome.from_ai, 1);

    store.append_transactions(txns).unwrap();

    // Reconcile: status becomes terminal, cache learns the merchant
    reconcile_one(&mut store, &first_id, "100").unwrap();
    assert_eq!(
        store.transaction(&first_id).unwrap().status,
        TransactionStatus::Reconciled
    );
    assert_eq!(
        store.merchant_cache().lookup("coles 0645 oakleigh 03"),
        Some("100")
    );

    // Re-import the same row: new id, same merchant key, no AI call
    let provider2 = MapProvider::new(&[]);
    let drafts = parse_statement_csv(STATEMENT).unwrap();
    let (txns, outcome) =
        categorize_batch(drafts, store.categories(), store.merchant_cache(), &provider2).await;

    assert_eq!(provider2.calls.load(Ordering::SeqCst), 0);
    assert_ne!(txns[0].id, first_id);
    assert_eq!(txns[0].category_code.as_deref(), Some("100"));
    assert_eq!(txns[0].suggested_by, SuggestedBy::Cache);
    assert_eq!(outcome.from_cache, 1);

    store.append_transactions(txns).unwrap();
    assert_eq!(store.transactions().len(), 2);
}

#[tokio::test]
async fn test_ai_outage_still_imports_then_bulk_reconcile_skips() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonStore::open(dir.path()).unwrap();
    seed_categories(&mut store);

    let text = concat!(
        "02/01/2026,\"-52.63\",\"COLES 0645 OAKLEIGH 03\",\"\"\n",
        "03/01/2026,\"+2500.00\",\"PAYROLL ACME PTY LTD\",\"\"\n",
    );
    let drafts = parse_statement_csv(text).unwrap();
    let (txns, outcome) =
        categorize_batch(drafts, store.categories(), store.merchant_cache(), &FailingProvider)
            .await;

    assert!(outcome.ai_call_failed);
    assert_eq!(outcome.unsuggested, 2);
    assert!(txns.iter().all(|t| t.status == TransactionStatus::Suggested));
    assert!(txns.iter().all(|t| t.category_code.is_none()));

    store.append_transactions(txns).unwrap();

    // Bulk reconcile has nothing it can apply; both rows are skipped
    let bulk = reconcile_all(&mut store).unwrap();
    assert_eq!(bulk.reconciled, 0);
    assert_eq!(bulk.skipped, 2);
    assert!(store.merchant_cache().is_empty());
}

#[tokio::test]
async fn test_reconciled_data_feeds_reports() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonStore::open(dir.path()).unwrap();
    seed_categories(&mut store);

    let text = concat!(
        "02/01/2026,\"-52.63\",\"COLES 0645 OAKLEIGH 03\",\"\"\n",
        "04/01/2026,\"-31.07\",\"COLES 0645 OAKLEIGH 03\",\"\"\n",
        "03/01/2026,\"+2500.00\",\"PAYROLL ACME PTY LTD\",\"\"\n",
    );
    let provider = MapProvider::new(&[
        ("coles 0645 oakleigh 03", "100"),
        ("payroll acme pty ltd", "1000"),
    ]);
    let drafts = parse_statement_csv(text).unwrap();
    let (txns, _) =
        categorize_batch(drafts, store.categories(), store.merchant_cache(), &provider).await;
    store.append_transactions(txns).unwrap();

    let bulk = reconcile_all(&mut store).unwrap();
    assert_eq!(bulk.reconciled, 3);
    assert_eq!(bulk.skipped, 0);

    let expenses = report_by_category(store.transactions(), store.categories(), ReportKind::Expenses);
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].name, "Groceries");
    assert!((expenses[0].total - 83.70).abs() < 1e-9);
    assert_eq!(expenses[0].transaction_count, 2);

    let income = report_by_category(store.transactions(), store.categories(), ReportKind::Income);
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].total, 2500.00);
}
