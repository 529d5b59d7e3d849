use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{BudgetError, Result};

/// A signed magnitude in a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub number: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }

    /// Parses an amount literal of the form `"<number> <currency>"`.
    ///
    /// Exactly two whitespace-separated tokens are accepted; anything else is
    /// rejected so that callers can drop the offending declaration.
    pub fn parse(literal: &str) -> Result<Self> {
        let tokens: Vec<&str> = literal.split_whitespace().collect();
        let [number, currency] = tokens.as_slice() else {
            return Err(BudgetError::InvalidAmount(literal.to_string()));
        };
        let number = number
            .parse::<Decimal>()
            .map_err(|_| BudgetError::InvalidAmount(literal.to_string()))?;
        Ok(Self::new(number, *currency))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

/// Per-currency accumulation of signed magnitudes.
///
/// Each currency key appears once; accumulation is plain addition and never
/// resets mid-computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    balances: BTreeMap<String, Decimal>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_amount(&mut self, amount: &Amount) {
        *self
            .balances
            .entry(amount.currency.clone())
            .or_insert(Decimal::ZERO) += amount.number;
    }

    /// Accumulated magnitude in `currency`, zero when the currency is absent.
    pub fn units(&self, currency: &str) -> Decimal {
        self.balances
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.balances.keys().map(String::as_str)
    }
}

/// One leg of a transaction: an account name and the units posted to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    pub units: Amount,
}

impl Posting {
    pub fn new(account: impl Into<String>, units: Amount) -> Self {
        Self {
            account: account.into(),
            units,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    pub postings: Vec<Posting>,
}

impl Transaction {
    pub fn new(date: NaiveDate, postings: Vec<Posting>) -> Self {
        Self {
            date,
            narration: None,
            postings,
        }
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }
}

/// A typed value carried by a custom directive.
///
/// Amounts arrive either already structured or as a raw literal inside the
/// `Str` case; [`DirectiveValue::to_amount`] is the explicit parse step that
/// bridges the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DirectiveValue {
    Str(String),
    Amount(Amount),
    Number(Decimal),
    Date(NaiveDate),
    Bool(bool),
}

impl DirectiveValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Resolves this value to an amount: structured amounts are returned
    /// as-is, string values are parsed as `"<number> <currency>"` literals,
    /// everything else yields `None`.
    pub fn to_amount(&self) -> Option<Amount> {
        match self {
            Self::Amount(amount) => Some(amount.clone()),
            Self::Str(literal) => Amount::parse(literal).ok(),
            _ => None,
        }
    }
}

/// A non-transaction declaration, e.g. a budget directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Custom {
    pub date: NaiveDate,
    pub directive_type: String,
    pub values: Vec<DirectiveValue>,
}

impl Custom {
    pub fn new(
        date: NaiveDate,
        directive_type: impl Into<String>,
        values: Vec<DirectiveValue>,
    ) -> Self {
        Self {
            date,
            directive_type: directive_type.into(),
            values,
        }
    }
}

/// One record of the ledger, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum LedgerEntry {
    Transaction(Transaction),
    Custom(Custom),
}

impl LedgerEntry {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Transaction(txn) => txn.date,
            Self::Custom(custom) => custom.date,
        }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(txn) => Some(txn),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&Custom> {
        match self {
            Self::Custom(custom) => Some(custom),
            _ => None,
        }
    }
}

/// A half-open date window `[begin, end)` as supplied by a report filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < begin {
            return Err(BudgetError::InvalidDateRange { begin, end });
        }
        Ok(Self { begin, end })
    }
}
