use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::budget::BudgetSet;
use crate::pattern::account_matches;
use crate::schema::{Inventory, LedgerEntry, Transaction};

/// Sums transaction postings into per-currency totals over an entry slice.
///
/// The two query styles use different interval semantics: the rollover
/// history walk consumes half-open months (`[start, end)`) so consecutive
/// months never overlap, while report queries receive an inclusive end date
/// from the caller and use a closed interval.
pub struct UsageCalculator<'a> {
    entries: &'a [LedgerEntry],
}

impl<'a> UsageCalculator<'a> {
    pub fn new(entries: &'a [LedgerEntry]) -> Self {
        Self { entries }
    }

    /// Total posted to accounts matching `pattern` in `currency` over the
    /// half-open window `[start, end)`.
    pub fn usage_for_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        pattern: &str,
        currency: &str,
    ) -> Decimal {
        let mut inventory = Inventory::new();
        for entry in self.entries {
            let Some(transaction) = entry.as_transaction() else {
                continue;
            };
            if transaction.date >= start && transaction.date < end {
                accumulate_matching(transaction, pattern, &mut inventory);
            }
        }
        inventory.units(currency)
    }

    /// Per-pattern usage over the closed window `[start, end]`.
    ///
    /// Each posting is attributed to exactly one matching pattern: the one
    /// with the greatest character length, so `Expenses:Food:*` absorbs a
    /// pizza purchase before `Expenses:*` can. Length ties go to the pattern
    /// encountered first in `budgets` order. Every budget pattern gets an
    /// entry, even when nothing matched it.
    pub fn usage_for_patterns(
        &self,
        budgets: &BudgetSet,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<String, Inventory> {
        let mut usage: BTreeMap<String, Inventory> = budgets
            .iter()
            .map(|series| (series.pattern().to_string(), Inventory::new()))
            .collect();

        for entry in self.entries {
            let Some(transaction) = entry.as_transaction() else {
                continue;
            };
            if transaction.date < start || transaction.date > end {
                continue;
            }
            for posting in &transaction.postings {
                let mut best: Option<&str> = None;
                for series in budgets.iter() {
                    let pattern = series.pattern();
                    if !account_matches(&posting.account, pattern) {
                        continue;
                    }
                    if best.map_or(true, |current| pattern.len() > current.len()) {
                        best = Some(pattern);
                    }
                }
                if let Some(pattern) = best {
                    if let Some(inventory) = usage.get_mut(pattern) {
                        inventory.add_amount(&posting.units);
                    }
                }
            }
        }
        usage
    }
}

fn accumulate_matching(transaction: &Transaction, pattern: &str, inventory: &mut Inventory) {
    for posting in &transaction.postings {
        if account_matches(&posting.account, pattern) {
            inventory.add_amount(&posting.units);
        }
    }
}
