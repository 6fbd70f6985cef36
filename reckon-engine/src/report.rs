//! Aggregate reconciled transactions by category for reporting.
//!
//! Only reconciled data counts; suggestions that were never confirmed stay
//! out of reports.

use std::collections::HashMap;

use reckon_core::{Category, Transaction, TransactionStatus};

/// Which side of the ledger to report on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Expenses,
    Income,
    All,
}

/// One category's reconciled total
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub code: String,
    pub name: String,
    pub total: f64,
    pub transaction_count: usize,
}

/// Group reconciled transactions by category code and sum absolute amounts,
/// largest total first. Codes with no matching category resolve to "Unknown".
pub fn report_by_category(
    transactions: &[Transaction],
    categories: &[Category],
    kind: ReportKind,
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for t in transactions {
        if t.status != TransactionStatus::Reconciled {
            continue;
        }
        let keep = match kind {
            ReportKind::Expenses => t.is_expense(),
            ReportKind::Income => t.is_income(),
            ReportKind::All => true,
        };
        if !keep {
            continue;
        }
        // Reconciled implies a category is present
        let Some(code) = t.category_code.as_deref() else {
            continue;
        };
        let entry = totals.entry(code).or_insert((0.0, 0));
        entry.0 += t.abs_amount();
        entry.1 += 1;
    }

    let names: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.code.as_str(), c.name.as_str()))
        .collect();

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(code, (total, count))| CategoryTotal {
            code: code.to_string(),
            name: names.get(code).copied().unwrap_or("Unknown").to_string(),
            total,
            transaction_count: count,
        })
        .collect();

    out.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reckon_core::{CategoryType, FixedOrVariable, TransactionDraft};

    fn reconciled(id: &str, amount: f64, code: &str) -> Transaction {
        let mut t = Transaction::from_draft(
            id,
            TransactionDraft::new(
                NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
                amount,
                "MERCHANT",
            ),
        );
        t.status = TransactionStatus::Reconciled;
        t.category_code = Some(code.to_string());
        t
    }

    fn categories() -> Vec<Category> {
        vec![
            Category::new("100", "Groceries", CategoryType::Expense, FixedOrVariable::Variable),
            Category::new("200", "Eating out", CategoryType::Expense, FixedOrVariable::Variable),
            Category::new("1000", "Salary", CategoryType::Income, FixedOrVariable::Fixed),
        ]
    }

    #[test]
    fn test_groups_and_sorts_by_total_descending() {
        let txns = vec![
            reconciled("t-1", -52.63, "100"),
            reconciled("t-2", -31.07, "100"),
            reconciled("t-3", -120.00, "200"),
        ];

        let report = report_by_category(&txns, &categories(), ReportKind::Expenses);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].code, "200");
        assert_eq!(report[0].total, 120.00);
        assert_eq!(report[1].code, "100");
        assert!((report[1].total - 83.70).abs() < 1e-9);
        assert_eq!(report[1].transaction_count, 2);
        assert_eq!(report[1].name, "Groceries");
    }

    #[test]
    fn test_expense_report_excludes_income() {
        let txns = vec![
            reconciled("t-1", -52.63, "100"),
            reconciled("t-2", 2500.00, "1000"),
        ];

        let expenses = report_by_category(&txns, &categories(), ReportKind::Expenses);
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].code, "100");

        let income = report_by_category(&txns, &categories(), ReportKind::Income);
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].code, "1000");

        let all = report_by_category(&txns, &categories(), ReportKind::All);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_unreconciled_transactions_never_count() {
        let mut suggested = reconciled("t-1", -52.63, "100");
        suggested.status = TransactionStatus::Suggested;

        let report = report_by_category(&[suggested], &categories(), ReportKind::All);
        assert!(report.is_empty());
    }

    #[test]
    fn test_unknown_code_resolves_to_unknown() {
        let txns = vec![reconciled("t-1", -10.00, "9999")];
        let report = report_by_category(&txns, &categories(), ReportKind::Expenses);
        assert_eq!(report[0].name, "Unknown");
    }
}
