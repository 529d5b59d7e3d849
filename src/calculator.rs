use chrono::NaiveDate;
use log::trace;
use rust_decimal::Decimal;

use crate::budget::BudgetSeries;
use crate::schema::Amount;
use crate::usage::UsageCalculator;
use crate::utils::{month_start, next_month_start, year_start};

/// Derives the effective budget amount for a report window, carrying unspent
/// (or overspent) monthly budget forward from earlier months.
///
/// The rollover walk revisits every month since the later of the year start
/// and the first definition, so its result depends on the full ledger, not
/// just the report window. A caching layer would have to key on
/// `(pattern, report_start)`.
pub struct BudgetCalculator<'a> {
    /// Usage over the full, unfiltered ledger. Rollover always looks at true
    /// history, independent of any report-level filter.
    history: UsageCalculator<'a>,
    today: NaiveDate,
}

impl<'a> BudgetCalculator<'a> {
    pub fn new(history: UsageCalculator<'a>, today: NaiveDate) -> Self {
        Self { history, today }
    }

    /// Effective gross budget and rollover contribution for one pattern over
    /// `[report_start, report_end]`.
    ///
    /// Rollover only applies when the most recent definition is a monthly
    /// budget with the rollover flag set; otherwise the latest amount is
    /// returned unchanged with a zero contribution.
    pub fn effective_budget(
        &self,
        series: &BudgetSeries,
        report_start: NaiveDate,
        report_end: NaiveDate,
    ) -> (Amount, Decimal) {
        let latest = series.latest();
        if !latest.rolls_over_monthly() {
            return (latest.amount.clone(), Decimal::ZERO);
        }

        let rollover = self.accumulated_rollover(series, report_start);
        let period_budget = self.period_budget(series, report_start, report_end);

        let total = Amount::new(period_budget + rollover, latest.amount.currency.clone());
        (total, rollover)
    }

    /// Walks whole months from `max(year start, first definition)` up to the
    /// report start, accumulating `budget - actual` for each month that had
    /// an active budget.
    fn accumulated_rollover(&self, series: &BudgetSeries, report_start: NaiveDate) -> Decimal {
        let calc_start = year_start(report_start).max(series.first().date);

        let mut current = month_start(calc_start);
        if current < calc_start {
            current = next_month_start(current);
        }

        let mut rollover = Decimal::ZERO;
        while current < report_start {
            let month_end = next_month_start(current);
            if let Some(active) = series.active_at(current) {
                let past_actual = self.history.usage_for_period(
                    current,
                    month_end,
                    &active.pattern,
                    &active.amount.currency,
                );
                let remainder = active.amount.number - past_actual;
                trace!(
                    "rollover {}: budget {} actual {} remainder {}",
                    current,
                    active.amount.number,
                    past_actual,
                    remainder
                );
                rollover += remainder;
            }
            current = month_end;
        }
        rollover
    }

    /// Sums the active budget amount at each month start inside the report
    /// window. An open-ended window is clamped to today.
    fn period_budget(
        &self,
        series: &BudgetSeries,
        report_start: NaiveDate,
        report_end: NaiveDate,
    ) -> Decimal {
        let mut current = month_start(report_start);
        if current < report_start {
            current = next_month_start(current);
        }

        let cutoff = if report_end == NaiveDate::MAX {
            self.today
        } else {
            report_end
        };

        let mut total = Decimal::ZERO;
        while current <= cutoff {
            if let Some(active) = series.active_at(current) {
                total += active.amount.number;
            }
            current = next_month_start(current);
        }
        total
    }
}
