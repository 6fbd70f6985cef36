//! reckon-ingest: bank-statement CSV parsing into transaction drafts.

pub mod statement;

pub use statement::{ParseError, parse_statement_csv};
