use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{Amount, Custom, DirectiveValue, LedgerEntry};

/// Directive type tag that marks a budget declaration.
pub const BUDGET_DIRECTIVE: &str = "budget";

/// Period label that enables the monthly rollover walk.
pub const MONTHLY_PERIOD: &str = "monthly";

/// One declared budget amount for a pattern, effective from `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDefinition {
    pub date: NaiveDate,
    pub pattern: String,
    pub amount: Amount,
    pub period: String,
    pub rollover: bool,
}

impl BudgetDefinition {
    /// Rollover only ever applies to monthly budgets; other period labels are
    /// carried for display but never drive the rollover walk.
    pub fn rolls_over_monthly(&self) -> bool {
        self.rollover && self.period == MONTHLY_PERIOD
    }
}

/// The chronological history of redefinitions for one pattern.
///
/// Definitions are ascending by effective date; same-date redefinitions keep
/// their encounter order. Always non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSeries {
    pattern: String,
    definitions: Vec<BudgetDefinition>,
}

impl BudgetSeries {
    fn new(definition: BudgetDefinition) -> Self {
        Self {
            pattern: definition.pattern.clone(),
            definitions: vec![definition],
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn definitions(&self) -> &[BudgetDefinition] {
        &self.definitions
    }

    /// Earliest definition in the series.
    pub fn first(&self) -> &BudgetDefinition {
        &self.definitions[0]
    }

    /// Most recent definition in the series.
    pub fn latest(&self) -> &BudgetDefinition {
        &self.definitions[self.definitions.len() - 1]
    }

    /// The definition in force on `date`: the last one whose effective date
    /// is on or before it.
    pub fn active_at(&self, date: NaiveDate) -> Option<&BudgetDefinition> {
        self.definitions
            .iter()
            .take_while(|definition| definition.date <= date)
            .last()
    }

    fn push(&mut self, definition: BudgetDefinition) {
        self.definitions.push(definition);
    }

    fn sort_by_date(&mut self) {
        // Stable, so same-date redefinitions keep declaration order.
        self.definitions.sort_by_key(|definition| definition.date);
    }
}

/// All budget series, ordered by each pattern's first declaration.
///
/// The ordering fixes the specificity tie-break during usage attribution and
/// the row order of the final report. Patterns are compared case-sensitively,
/// so patterns differing only in case stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetSet {
    series: Vec<BudgetSeries>,
}

impl BudgetSet {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BudgetSeries> {
        self.series.iter()
    }

    pub fn get(&self, pattern: &str) -> Option<&BudgetSeries> {
        self.series.iter().find(|series| series.pattern == pattern)
    }

    fn insert(&mut self, definition: BudgetDefinition) {
        match self
            .series
            .iter_mut()
            .find(|series| series.pattern == definition.pattern)
        {
            Some(series) => series.push(definition),
            None => self.series.push(BudgetSeries::new(definition)),
        }
    }

    fn sort_each_by_date(&mut self) {
        for series in &mut self.series {
            series.sort_by_date();
        }
    }
}

/// Extracts typed budget declarations from raw ledger directives.
pub struct BudgetParser<'a> {
    entries: &'a [LedgerEntry],
}

impl<'a> BudgetParser<'a> {
    pub fn new(entries: &'a [LedgerEntry]) -> Self {
        Self { entries }
    }

    /// Parses every `budget` directive dated strictly before `cutoff` into a
    /// [`BudgetSet`]. Malformed declarations are dropped, never surfaced: a
    /// single bad directive must not block the rest of the report.
    pub fn parse_definitions(&self, cutoff: NaiveDate) -> BudgetSet {
        let mut budgets = BudgetSet::default();
        for entry in self.entries {
            let Some(custom) = entry.as_custom() else {
                continue;
            };
            if custom.directive_type != BUDGET_DIRECTIVE || custom.date >= cutoff {
                continue;
            }
            match parse_declaration(custom) {
                Some(definition) => budgets.insert(definition),
                None => debug!(
                    "dropping malformed budget declaration dated {} ({} values)",
                    custom.date,
                    custom.values.len()
                ),
            }
        }
        budgets.sort_each_by_date();
        budgets
    }
}

fn parse_declaration(custom: &Custom) -> Option<BudgetDefinition> {
    if custom.values.len() < 3 {
        return None;
    }
    let pattern = custom.values[0].as_str()?.to_string();
    let period = custom.values[1].as_str()?.to_string();
    let amount = custom.values[2].to_amount()?;
    let rollover = custom
        .values
        .get(3)
        .and_then(DirectiveValue::as_str)
        .is_some_and(|flag| flag.eq_ignore_ascii_case("rollover"));

    Some(BudgetDefinition {
        date: custom.date,
        pattern,
        amount,
        period,
        rollover,
    })
}
