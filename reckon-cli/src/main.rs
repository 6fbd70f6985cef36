use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reckon_core::{Category, CategoryType, FixedOrVariable, TransactionStatus};
use reckon_engine::{
    AnthropicProvider, BatchOutcome, JsonStore, ReportKind, UnconfiguredProvider, categorize_batch,
    reconcile_all, reconcile_one, report_by_category,
};
use reckon_ingest::parse_statement_csv;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "reckon", version, about = "Bank-statement categorization and reconciliation")]
struct Cli {
    /// Data directory (default: ~/.reckon)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a statement CSV and suggest categories (at most one AI call)
    Import {
        /// Path to the statement CSV
        #[arg(long)]
        csv: PathBuf,
    },

    /// List transactions
    List {
        /// Filter: pending | suggested | reconciled
        #[arg(long)]
        status: Option<String>,
    },

    /// Confirm or correct one transaction's category
    Reconcile {
        /// Transaction id
        id: String,

        /// Chosen category code
        #[arg(long)]
        category: String,
    },

    /// Reconcile every suggested transaction using its current suggestion
    ReconcileAll,

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// Aggregate reconciled transactions by category
    Report {
        /// expenses | income | all
        #[arg(long, default_value = "expenses")]
        kind: String,
    },

    /// Config management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// List known categories
    List,

    /// Add a category
    Add {
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: String,

        /// expense | income | asset
        #[arg(long, default_value = "expense")]
        category_type: String,

        /// fixed | variable
        #[arg(long, default_value = "variable")]
        fixed: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml into the data directory
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let data_dir = state::ensure_data_dir(cli.data_dir)?;
    let mut store = JsonStore::open(&data_dir)?;

    match cli.command {
        Command::Import { csv } => {
            import(&mut store, &data_dir, &csv).await?;
        }

        Command::List { status } => {
            let filter = status.as_deref().map(parse_status).transpose()?;
            list(&store, filter);
        }

        Command::Reconcile { id, category } => {
            reconcile_one(&mut store, &id, &category)?;
            println!("Reconciled {id} as {category}");
        }

        Command::ReconcileAll => {
            let outcome = reconcile_all(&mut store)?;
            println!("Reconciled {} transactions", outcome.reconciled);
            if outcome.skipped > 0 {
                println!(
                    "Skipped {} without a category (reconcile them individually)",
                    outcome.skipped
                );
            }
        }

        Command::Categories { command } => match command {
            CategoryCommand::List => {
                for c in store.categories() {
                    println!(
                        "{:<6} {:<24} {:<8} {}",
                        c.code,
                        c.name,
                        c.category_type.as_str(),
                        match c.fixed {
                            FixedOrVariable::Fixed => "fixed",
                            FixedOrVariable::Variable => "variable",
                        }
                    );
                }
            }
            CategoryCommand::Add {
                code,
                name,
                category_type,
                fixed,
            } => {
                let category = Category::new(
                    code.clone(),
                    name,
                    parse_category_type(&category_type)?,
                    parse_fixed(&fixed)?,
                );
                store.add_category(category)?;
                println!("Added category {code}");
            }
        },

        Command::Report { kind } => {
            let kind = parse_report_kind(&kind)?;
            let rows = report_by_category(store.transactions(), store.categories(), kind);
            if rows.is_empty() {
                println!("Nothing reconciled yet");
            }
            for row in &rows {
                println!(
                    "{:<6} {:<24} ${:>10.2}  ({} txns)",
                    row.code, row.name, row.total, row.transaction_count
                );
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                config::init_config(&data_dir)?;
            }
        },
    }

    Ok(())
}

async fn import(store: &mut JsonStore, data_dir: &Path, csv_path: &Path) -> Result<()> {
    if !csv_path.exists() {
        bail!("CSV not found: {}", csv_path.display());
    }
    let text = std::fs::read_to_string(csv_path)
        .with_context(|| format!("read {}", csv_path.display()))?;
    let drafts =
        parse_statement_csv(&text).with_context(|| format!("parsing {}", csv_path.display()))?;
    if drafts.is_empty() {
        println!("No rows found in {}", csv_path.display());
        return Ok(());
    }

    let cfg = config::load_config(data_dir)?;
    let timeout = Duration::from_secs(cfg.llm.timeout_secs);

    // A missing API key only skips AI enrichment; the import still runs.
    let (txns, outcome) = match AnthropicProvider::from_env(&cfg.llm.model, timeout) {
        Ok(provider) => {
            categorize_batch(drafts, store.categories(), store.merchant_cache(), &provider).await
        }
        Err(_) => {
            categorize_batch(
                drafts,
                store.categories(),
                store.merchant_cache(),
                &UnconfiguredProvider,
            )
            .await
        }
    };

    let imported = txns.len();
    store.append_transactions(txns)?;

    println!("Imported {} transactions from {}", imported, csv_path.display());
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &BatchOutcome) {
    println!(
        "  cached: {}  ai: {}  unsuggested: {}",
        outcome.from_cache, outcome.from_ai, outcome.unsuggested
    );
    if outcome.ai_call_failed {
        println!("  warning: AI categorization failed; uncached transactions imported without suggestions");
    }
}

fn list(store: &JsonStore, filter: Option<TransactionStatus>) {
    for t in store.transactions() {
        if let Some(status) = filter {
            if t.status != status {
                continue;
            }
        }
        println!(
            "{}  {}  {:>10.2}  {:<6} {:<10} {:<6}  {}",
            t.id,
            t.date,
            t.amount,
            t.category_code.as_deref().unwrap_or("-"),
            t.status.as_str(),
            t.suggested_by.as_str(),
            t.description
        );
    }
}

fn parse_status(s: &str) -> Result<TransactionStatus> {
    match s {
        "pending" => Ok(TransactionStatus::Pending),
        "suggested" => Ok(TransactionStatus::Suggested),
        "reconciled" => Ok(TransactionStatus::Reconciled),
        other => bail!("unknown status `{other}` (expected pending | suggested | reconciled)"),
    }
}

fn parse_report_kind(s: &str) -> Result<ReportKind> {
    match s {
        "expenses" => Ok(ReportKind::Expenses),
        "income" => Ok(ReportKind::Income),
        "all" => Ok(ReportKind::All),
        other => bail!("unknown report kind `{other}` (expected expenses | income | all)"),
    }
}

fn parse_category_type(s: &str) -> Result<CategoryType> {
    match s {
        "expense" => Ok(CategoryType::Expense),
        "income" => Ok(CategoryType::Income),
        "asset" => Ok(CategoryType::Asset),
        other => bail!("unknown category type `{other}` (expected expense | income | asset)"),
    }
}

fn parse_fixed(s: &str) -> Result<FixedOrVariable> {
    match s {
        "fixed" => Ok(FixedOrVariable::Fixed),
        "variable" => Ok(FixedOrVariable::Variable),
        other => bail!("unknown value `{other}` (expected fixed | variable)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("pending").unwrap(), TransactionStatus::Pending);
        assert_eq!(parse_status("reconciled").unwrap(), TransactionStatus::Reconciled);
        assert!(parse_status("done").is_err());
    }

    #[test]
    fn test_parse_report_kind() {
        assert_eq!(parse_report_kind("all").unwrap(), ReportKind::All);
        assert!(parse_report_kind("everything").is_err());
    }
}
