//! # Budget Report
//!
//! A library for computing budget-vs-actual reports over a double-entry
//! ledger: budgets are declared per account pattern (with optional
//! wildcards), evaluated over a reporting window, carried forward month by
//! month when rollover is enabled, and de-duplicated across the account
//! hierarchy so a child budget is never counted under its parent twice.
//!
//! ## Core Concepts
//!
//! - **Pattern**: a string addressing one account or an account family,
//!   optionally with a shell-style `*` wildcard (`Expenses:Food:*`)
//! - **Budget Series**: the chronological redefinitions of one pattern's
//!   budget, parsed from `budget` custom directives
//! - **Rollover**: unspent (or overspent) monthly budget carried forward
//!   from every month since the year start into the report window
//! - **Specificity**: when several patterns match a posting, the longest
//!   pattern receives the usage
//! - **Adjustment**: a parent pattern's budget minus its direct children's
//!   budgets, so committed amounts appear only once
//!
//! ## Example
//!
//! ```rust,ignore
//! use budget_report::*;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let entries = vec![
//!     LedgerEntry::Custom(Custom::new(
//!         NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
//!         "budget",
//!         vec![
//!             DirectiveValue::Str("Expenses:Food:*".to_string()),
//!             DirectiveValue::Str("monthly".to_string()),
//!             DirectiveValue::Str("450 USD".to_string()),
//!             DirectiveValue::Str("rollover".to_string()),
//!         ],
//!     )),
//!     LedgerEntry::Transaction(Transaction::new(
//!         NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
//!         vec![Posting::new(
//!             "Expenses:Food:Pizza",
//!             Amount::new(Decimal::new(2150, 2), "USD"),
//!         )],
//!     )),
//! ];
//!
//! let report = generate_budget_report(&entries, &ReportQuery::for_today());
//! for row in &report.rows {
//!     println!("{}: {} of {}", row.account_name, row.actual, row.budget);
//! }
//! ```
//!
//! The engine is a pure function of its inputs: nothing is cached between
//! invocations and no entry slice is ever mutated, so concurrent reports can
//! run against shared snapshots without coordination.

pub mod budget;
pub mod calculator;
pub mod error;
pub mod pattern;
pub mod report;
pub mod schema;
pub mod usage;
pub mod utils;

pub use budget::{
    BudgetDefinition, BudgetParser, BudgetSeries, BudgetSet, BUDGET_DIRECTIVE, MONTHLY_PERIOD,
};
pub use calculator::BudgetCalculator;
pub use error::{BudgetError, Result};
pub use pattern::{account_matches, display_name, is_subset};
pub use report::{
    generate_budget_report, BudgetReport, BudgetReporter, ReportQuery, ReportRow,
    DEFAULT_TOTAL_PATTERN,
};
pub use schema::{
    Amount, Custom, DateRange, DirectiveValue, Inventory, LedgerEntry, Posting, Transaction,
};
pub use usage::UsageCalculator;
pub use utils::{month_start, next_month_start, resolve_report_range, year_progress, year_start};
