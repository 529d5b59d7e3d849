use chrono::{Days, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budget::{BudgetParser, BudgetSeries, BudgetSet};
use crate::calculator::BudgetCalculator;
use crate::pattern::{display_name, is_subset};
use crate::schema::{Amount, DateRange, Inventory, LedgerEntry};
use crate::usage::UsageCalculator;
use crate::utils::{resolve_report_range, year_progress};

/// Pattern whose row is lifted out of the report body and shown as the grand
/// total instead.
pub const DEFAULT_TOTAL_PATTERN: &str = "Expenses:*";

/// Explicit report context: which entries to report over, the selected date
/// filter, and the date to treat as "now". Absent fields fall back to the
/// full history and the current calendar year.
#[derive(Debug, Clone, Copy)]
pub struct ReportQuery<'a> {
    /// Filtered entry subsequence for the report body; `None` means the full
    /// unfiltered history.
    pub entries: Option<&'a [LedgerEntry]>,
    /// Selected date filter, end exclusive. `None` defaults the window to the
    /// current calendar year up to `today`.
    pub range: Option<DateRange>,
    pub today: NaiveDate,
}

impl<'a> ReportQuery<'a> {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            entries: None,
            range: None,
            today,
        }
    }

    /// Query anchored to the system clock, for hosts that don't inject one.
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn with_entries(mut self, entries: &'a [LedgerEntry]) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// One line of the budget report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub pattern: String,
    /// Pattern with trailing wildcard stripped, suitable for account links.
    pub account_name: String,
    /// Net budget: gross minus the direct children's gross budgets.
    pub budget: Amount,
    /// Gross budget before the parent/child adjustment.
    pub unadjusted_budget: Amount,
    /// Actual usage attributed to this pattern under the specificity rule.
    pub actual: Amount,
    /// Actual usage including every descendant account.
    pub total_actual: Amount,
    pub percent: Decimal,
    pub unadjusted_percent: Decimal,
    /// Year-elapsed percentage, identical on every row of one report.
    pub time_percent: Option<Decimal>,
    pub period: String,
    pub rollover: Decimal,
    pub is_rollover: bool,
}

/// A fully assembled budget report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub rows: Vec<ReportRow>,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    /// Row extracted for the catch-all pattern, when one was budgeted.
    pub total_row: Option<ReportRow>,
}

/// Assembles budget reports from an immutable ledger snapshot.
pub struct BudgetReporter<'a> {
    all_entries: &'a [LedgerEntry],
    total_pattern: String,
}

impl<'a> BudgetReporter<'a> {
    pub fn new(all_entries: &'a [LedgerEntry]) -> Self {
        Self {
            all_entries,
            total_pattern: DEFAULT_TOTAL_PATTERN.to_string(),
        }
    }

    /// Overrides which pattern is reported as the grand total.
    pub fn with_total_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.total_pattern = pattern.into();
        self
    }

    pub fn generate(&self, query: &ReportQuery<'_>) -> BudgetReport {
        let (report_start, report_end) = resolve_report_range(query.range.as_ref(), query.today);
        let time_percent = year_progress(query.range.as_ref(), query.today);
        let report_entries = query.entries.unwrap_or(self.all_entries);

        // Budget definitions and rollover history always come from the full
        // ledger; only the report body respects the filtered view.
        let budgets = BudgetParser::new(self.all_entries).parse_definitions(report_end);
        let calculator =
            BudgetCalculator::new(UsageCalculator::new(self.all_entries), query.today);
        let report_usage = UsageCalculator::new(report_entries);

        debug!(
            "budget report over {}..{} covering {} patterns",
            report_start,
            report_end,
            budgets.len()
        );

        let rows = build_rows(
            &budgets,
            &calculator,
            &report_usage,
            report_start,
            report_end,
            time_percent,
        );

        let mut total_row = None;
        let mut body = Vec::with_capacity(rows.len());
        for row in rows {
            if row.pattern == self.total_pattern {
                total_row = Some(row);
            } else {
                body.push(row);
            }
        }

        BudgetReport {
            rows: body,
            range_start: report_start,
            range_end: report_end,
            total_row,
        }
    }
}

/// Convenience wrapper over [`BudgetReporter`] with the default grand-total
/// pattern.
pub fn generate_budget_report(
    all_entries: &[LedgerEntry],
    query: &ReportQuery<'_>,
) -> BudgetReport {
    BudgetReporter::new(all_entries).generate(query)
}

struct ComputedBudget<'b> {
    series: &'b BudgetSeries,
    gross: Amount,
    rollover: Decimal,
}

fn build_rows(
    budgets: &BudgetSet,
    calculator: &BudgetCalculator<'_>,
    report_usage: &UsageCalculator<'_>,
    report_start: NaiveDate,
    report_end: NaiveDate,
    time_percent: Option<Decimal>,
) -> Vec<ReportRow> {
    // Pre-computed so each posting lands under its most specific pattern
    // only.
    let usage_map = report_usage.usage_for_patterns(budgets, report_start, report_end);

    // First pass: gross effective budget and rollover per pattern.
    let computed: Vec<ComputedBudget<'_>> = budgets
        .iter()
        .map(|series| {
            let (gross, rollover) = calculator.effective_budget(series, report_start, report_end);
            ComputedBudget {
                series,
                gross,
                rollover,
            }
        })
        .collect();

    // Second pass: subtract each pattern's direct children, so an amount
    // committed to a child budget is not counted under the parent as well.
    let adjusted: Vec<Amount> = computed
        .iter()
        .map(|parent| adjusted_budget(parent, &computed))
        .collect();

    let empty = Inventory::new();
    // One day past the inclusive report end, so the half-open accumulator
    // covers the final day.
    let gross_actual_end = report_end
        .checked_add_days(Days::new(1))
        .unwrap_or(report_end);

    computed
        .iter()
        .zip(adjusted)
        .map(|(computed, budget)| {
            let pattern = computed.series.pattern();
            let latest = computed.series.latest();
            let gross = &computed.gross;

            let inventory = usage_map.get(pattern).unwrap_or(&empty);
            let actual = inventory.units(&budget.currency);
            let percent = percent_of(actual, budget.number);

            let total_actual = report_usage.usage_for_period(
                report_start,
                gross_actual_end,
                pattern,
                &gross.currency,
            );
            let unadjusted_percent = percent_of(total_actual, gross.number);

            ReportRow {
                pattern: pattern.to_string(),
                account_name: display_name(pattern).to_string(),
                actual: Amount::new(actual, budget.currency.clone()),
                total_actual: Amount::new(total_actual, gross.currency.clone()),
                budget,
                unadjusted_budget: gross.clone(),
                percent,
                unadjusted_percent,
                time_percent,
                period: latest.period.clone(),
                rollover: computed.rollover,
                is_rollover: latest.rollover,
            }
        })
        .collect()
}

fn adjusted_budget(parent: &ComputedBudget<'_>, all: &[ComputedBudget<'_>]) -> Amount {
    let parent_pattern = parent.series.pattern();

    let candidates: Vec<(&str, Decimal)> = all
        .iter()
        .filter(|child| {
            child.series.pattern() != parent_pattern
                && child.gross.currency == parent.gross.currency
                && is_subset(child.series.pattern(), parent_pattern)
        })
        .map(|child| (child.series.pattern(), child.gross.number))
        .collect();

    // Direct children only: a candidate nested beneath another candidate is
    // already accounted for by that intermediate budget.
    let subtracted: Decimal = candidates
        .iter()
        .filter(|(child, _)| {
            !candidates
                .iter()
                .any(|(other, _)| other != child && is_subset(child, other))
        })
        .map(|(_, gross)| *gross)
        .sum();

    Amount::new(
        parent.gross.number - subtracted,
        parent.gross.currency.clone(),
    )
}

fn percent_of(actual: Decimal, budget: Decimal) -> Decimal {
    if budget.is_zero() {
        return Decimal::ZERO;
    }
    actual / budget * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BUDGET_DIRECTIVE, MONTHLY_PERIOD};
    use crate::schema::{Custom, DirectiveValue, Posting, Transaction};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn declare(on: NaiveDate, pattern: &str, amount: &str) -> LedgerEntry {
        LedgerEntry::Custom(Custom::new(
            on,
            BUDGET_DIRECTIVE,
            vec![
                DirectiveValue::Str(pattern.to_string()),
                DirectiveValue::Str(MONTHLY_PERIOD.to_string()),
                DirectiveValue::Str(amount.to_string()),
            ],
        ))
    }

    fn spend(on: NaiveDate, account: &str, number: i64) -> LedgerEntry {
        LedgerEntry::Transaction(Transaction::new(
            on,
            vec![Posting::new(
                account,
                Amount::new(Decimal::from(number), "USD"),
            )],
        ))
    }

    fn january_query() -> ReportQuery<'static> {
        ReportQuery::new(date(2026, 8, 7))
            .with_range(DateRange::new(date(2026, 1, 1), date(2026, 2, 1)).unwrap())
    }

    fn row<'r>(report: &'r BudgetReport, pattern: &str) -> &'r ReportRow {
        report
            .rows
            .iter()
            .find(|row| row.pattern == pattern)
            .unwrap()
    }

    #[test]
    fn test_parent_budget_subtracts_direct_children() {
        let entries = vec![
            declare(date(2026, 1, 1), "Expenses:*", "500 USD"),
            declare(date(2026, 1, 1), "Expenses:Food:*", "200 USD"),
        ];

        let report = generate_budget_report(&entries, &january_query());

        assert_eq!(
            report.total_row.as_ref().unwrap().budget.number,
            Decimal::from(300)
        );
        assert_eq!(
            report.total_row.as_ref().unwrap().unadjusted_budget.number,
            Decimal::from(500)
        );
        assert_eq!(
            row(&report, "Expenses:Food:*").budget.number,
            Decimal::from(200)
        );
    }

    #[test]
    fn test_grandchildren_are_not_subtracted_twice() {
        let entries = vec![
            declare(date(2026, 1, 1), "Expenses:*", "500 USD"),
            declare(date(2026, 1, 1), "Expenses:Food:*", "200 USD"),
            declare(date(2026, 1, 1), "Expenses:Food:Pizza:*", "50 USD"),
        ];

        let report = generate_budget_report(&entries, &january_query());

        // Only Expenses:Food:* is a direct child of Expenses:*; the pizza
        // budget is already inside it.
        assert_eq!(
            report.total_row.as_ref().unwrap().budget.number,
            Decimal::from(300)
        );
        assert_eq!(
            row(&report, "Expenses:Food:*").budget.number,
            Decimal::from(150)
        );
    }

    #[test]
    fn test_other_currencies_are_not_subtracted() {
        let entries = vec![
            declare(date(2026, 1, 1), "Expenses:*", "500 USD"),
            declare(date(2026, 1, 1), "Expenses:Food:*", "200 EUR"),
        ];

        let report = generate_budget_report(&entries, &january_query());

        assert_eq!(
            report.total_row.as_ref().unwrap().budget.number,
            Decimal::from(500)
        );
    }

    #[test]
    fn test_zero_budget_reports_zero_percent() {
        let entries = vec![
            declare(date(2026, 1, 1), "Expenses:Food:*", "0 USD"),
            spend(date(2026, 1, 10), "Expenses:Food:Pizza", 25),
        ];

        let report = generate_budget_report(&entries, &january_query());
        let food = row(&report, "Expenses:Food:*");

        assert_eq!(food.actual.number, Decimal::from(25));
        assert_eq!(food.percent, Decimal::ZERO);
        assert_eq!(food.unadjusted_percent, Decimal::ZERO);
    }

    #[test]
    fn test_net_and_gross_actuals() {
        let entries = vec![
            declare(date(2026, 1, 1), "Expenses:*", "500 USD"),
            declare(date(2026, 1, 1), "Expenses:Food:*", "200 USD"),
            spend(date(2026, 1, 10), "Expenses:Food:Pizza", 40),
            spend(date(2026, 1, 12), "Expenses:Rent", 100),
        ];

        let report = generate_budget_report(&entries, &january_query());

        // Net actual honours specificity; gross actual counts descendants.
        let total = report.total_row.as_ref().unwrap();
        assert_eq!(total.actual.number, Decimal::from(100));
        assert_eq!(total.total_actual.number, Decimal::from(140));

        let food = row(&report, "Expenses:Food:*");
        assert_eq!(food.actual.number, Decimal::from(40));
        assert_eq!(food.total_actual.number, Decimal::from(40));
        assert_eq!(food.percent, Decimal::from(20));
    }

    #[test]
    fn test_catch_all_row_is_extracted() {
        let entries = vec![
            declare(date(2026, 1, 1), "Expenses:*", "500 USD"),
            declare(date(2026, 1, 1), "Expenses:Food:*", "200 USD"),
        ];

        let report = generate_budget_report(&entries, &january_query());

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].pattern, "Expenses:Food:*");
        assert_eq!(report.total_row.as_ref().unwrap().pattern, "Expenses:*");
        assert_eq!(report.total_row.as_ref().unwrap().account_name, "Expenses");
    }

    #[test]
    fn test_custom_total_pattern() {
        let entries = vec![
            declare(date(2026, 1, 1), "Costs:*", "500 USD"),
            declare(date(2026, 1, 1), "Costs:Food:*", "200 USD"),
        ];

        let report = BudgetReporter::new(&entries)
            .with_total_pattern("Costs:*")
            .generate(&january_query());

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total_row.as_ref().unwrap().pattern, "Costs:*");
    }

    #[test]
    fn test_default_window_covers_current_year() {
        let entries = vec![declare(date(2026, 1, 1), "Expenses:Food:*", "100 USD")];

        let today = date(2026, 8, 7);
        let report = generate_budget_report(&entries, &ReportQuery::new(today));

        assert_eq!(report.range_start, date(2026, 1, 1));
        assert_eq!(report.range_end, today);
        assert!(report.rows[0].time_percent.is_none());
    }

    #[test]
    fn test_time_percent_is_shared_across_rows() {
        let entries = vec![
            declare(date(2025, 1, 1), "Expenses:Food:*", "100 USD"),
            declare(date(2025, 1, 1), "Expenses:Rent:*", "900 USD"),
        ];

        let query = ReportQuery::new(date(2026, 8, 7))
            .with_range(DateRange::new(date(2025, 1, 1), date(2026, 1, 1)).unwrap());
        let report = generate_budget_report(&entries, &query);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].time_percent, Some(Decimal::ONE_HUNDRED));
        assert_eq!(report.rows[0].time_percent, report.rows[1].time_percent);
    }

    #[test]
    fn test_filtered_entries_shape_actuals_but_not_rollover() {
        let all_entries = vec![
            LedgerEntry::Custom(Custom::new(
                date(2026, 1, 1),
                BUDGET_DIRECTIVE,
                vec![
                    DirectiveValue::Str("Expenses:Food:*".to_string()),
                    DirectiveValue::Str(MONTHLY_PERIOD.to_string()),
                    DirectiveValue::Str("100 USD".to_string()),
                    DirectiveValue::Str("rollover".to_string()),
                ],
            )),
            spend(date(2026, 1, 10), "Expenses:Food:Pizza", 60),
            spend(date(2026, 2, 10), "Expenses:Food:Pizza", 30),
        ];
        // The filter drops January entirely.
        let filtered: Vec<LedgerEntry> = all_entries
            .iter()
            .filter(|entry| entry.date() >= date(2026, 2, 1))
            .cloned()
            .collect();

        let query = ReportQuery::new(date(2026, 8, 7))
            .with_entries(&filtered)
            .with_range(DateRange::new(date(2026, 2, 1), date(2026, 3, 1)).unwrap());
        let report = generate_budget_report(&all_entries, &query);

        let food = row(&report, "Expenses:Food:*");
        // Rollover still sees January's 60 spend from the full history.
        assert_eq!(food.rollover, Decimal::from(40));
        assert_eq!(food.unadjusted_budget.number, Decimal::from(140));
        assert_eq!(food.actual.number, Decimal::from(30));
    }

    #[test]
    fn test_report_is_idempotent() {
        let entries = vec![
            declare(date(2026, 1, 1), "Expenses:*", "500 USD"),
            declare(date(2026, 1, 1), "Expenses:Food:*", "200 USD"),
            spend(date(2026, 1, 10), "Expenses:Food:Pizza", 40),
        ];

        let first = generate_budget_report(&entries, &january_query());
        let second = generate_budget_report(&entries, &january_query());
        assert_eq!(first, second);
    }
}
