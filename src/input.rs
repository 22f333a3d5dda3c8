//! Raw form input: sanitizing typed text and reading it as decimals.
//!
//! The simulator form accepts free text in each field. Every keystroke goes through
//! [`sanitize`], and the stored text is read back with [`parse_number`] (or
//! [`parse_number_with`] when the caller commits to one separator convention).

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{SimulationInput, SimulationResult, calculate_simulation};

/// Keeps only ASCII digits, `.` and `,` from the typed text.
///
/// The result is not guaranteed to be a well-formed number: `"1.2.3"` passes through
/// unchanged.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect()
}

/// How the decimal separator is told apart from a grouping separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumberConvention {
    /// Only the first comma is turned into a point and the longest numeric prefix is read.
    /// `"1.234,56"` reads as `1.234`.
    #[default]
    Lenient,
    /// Brazilian style: `.` groups thousands and `,` separates decimals.
    CommaDecimal,
    /// `,` groups thousands and `.` separates decimals.
    PointDecimal,
}

/// Reads a field value as a decimal using the [`NumberConvention::Lenient`] rule.
///
/// Empty, blank or non-numeric text reads as zero; this never fails.
pub fn parse_number(value: &str) -> Decimal {
    parse_number_with(value, NumberConvention::Lenient)
}

/// Reads a field value as a decimal under an explicit separator convention.
pub fn parse_number_with(value: &str, convention: NumberConvention) -> Decimal {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    let normalized = match convention {
        NumberConvention::Lenient => trimmed.replacen(',', ".", 1),
        NumberConvention::CommaDecimal => trimmed.replace('.', "").replacen(',', ".", 1),
        NumberConvention::PointDecimal => trimmed.replace(',', ""),
    };

    match leading_number(&normalized) {
        Some(number) => number,
        None => {
            debug!(value, ?convention, "no number in field value, reading as zero");
            Decimal::ZERO
        }
    }
}

/// Reads the longest `[+-]digits[.digits]` prefix of `text`.
fn leading_number(text: &str) -> Option<Decimal> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let integer_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    let (integer, rest) = unsigned.split_at(integer_len);
    let fraction = rest
        .strip_prefix('.')
        .map(|tail| &tail[..tail.bytes().take_while(u8::is_ascii_digit).count()])
        .unwrap_or("");

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let literal = if fraction.is_empty() {
        integer.to_string()
    } else if integer.is_empty() {
        format!("0.{}", fraction)
    } else {
        format!("{}.{}", integer, fraction)
    };

    // Integers beyond the Decimal range are not representable.
    let value = Decimal::from_str(&literal).ok()?;
    Some(if negative { -value } else { value })
}

/// One of the five input fields of the simulator form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    AssetValue,
    TermMonths,
    BankRate,
    Iof,
    ExtraExpenses,
}

impl Field {
    /// Fields in the order the form shows them.
    pub const ALL: [Field; 5] = [
        Field::AssetValue,
        Field::TermMonths,
        Field::BankRate,
        Field::Iof,
        Field::ExtraExpenses,
    ];

    /// The pt-BR label shown next to the input box.
    pub fn label(self) -> &'static str {
        match self {
            Field::AssetValue => "Valor do bem",
            Field::TermMonths => "Prazo em meses",
            Field::BankRate => "Taxa banco (%)",
            Field::Iof => "IOF (%)",
            Field::ExtraExpenses => "Despesas extras",
        }
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "asset_value" | "assetValue" => Ok(Field::AssetValue),
            "term_months" | "termMonths" => Ok(Field::TermMonths),
            "bank_rate" | "bankRate" => Ok(Field::BankRate),
            "iof" => Ok(Field::Iof),
            "extra_expenses" | "extraExpenses" => Ok(Field::ExtraExpenses),
            other => Err(anyhow::anyhow!("Unknown form field: {other}")),
        }
    }
}

/// The raw text of the five form fields.
///
/// The record is never edited in place: [`SimulationForm::with_field`] returns the next
/// state, and the results are derived from it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationForm {
    #[serde(default)]
    pub asset_value: String,
    #[serde(default)]
    pub term_months: String,
    #[serde(default)]
    pub bank_rate: String,
    #[serde(default)]
    pub iof: String,
    #[serde(default)]
    pub extra_expenses: String,
}

impl Default for SimulationForm {
    /// The values the form opens with.
    fn default() -> Self {
        Self {
            asset_value: "50000000".to_string(),
            term_months: "60".to_string(),
            bank_rate: "2.5".to_string(),
            iof: "0".to_string(),
            extra_expenses: "0".to_string(),
        }
    }
}

impl SimulationForm {
    /// Loads a form from JSON with camelCase keys. Missing keys read as empty and every
    /// value is sanitized.
    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        let raw: SimulationForm = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Invalid simulation form JSON: {e}"))?;

        Ok(Field::ALL
            .into_iter()
            .fold(raw.clone(), |form, field| form.with_field(field, raw.field(field))))
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::AssetValue => &self.asset_value,
            Field::TermMonths => &self.term_months,
            Field::BankRate => &self.bank_rate,
            Field::Iof => &self.iof,
            Field::ExtraExpenses => &self.extra_expenses,
        }
    }

    /// Returns the form with `field` set to the sanitized `raw` text.
    pub fn with_field(mut self, field: Field, raw: &str) -> Self {
        let clean = sanitize(raw);
        let slot = match field {
            Field::AssetValue => &mut self.asset_value,
            Field::TermMonths => &mut self.term_months,
            Field::BankRate => &mut self.bank_rate,
            Field::Iof => &mut self.iof,
            Field::ExtraExpenses => &mut self.extra_expenses,
        };
        *slot = clean;
        self
    }

    pub fn to_input(&self) -> SimulationInput {
        self.to_input_with(NumberConvention::default())
    }

    pub fn to_input_with(&self, convention: NumberConvention) -> SimulationInput {
        let read = |field| parse_number_with(self.field(field), convention);

        SimulationInput {
            asset_value: read(Field::AssetValue),
            term_months: read(Field::TermMonths),
            bank_rate: read(Field::BankRate),
            iof: read(Field::Iof),
            extra_expenses: read(Field::ExtraExpenses),
        }
    }

    pub fn calculate(&self) -> SimulationResult {
        calculate_simulation(self.to_input())
    }

    pub fn calculate_with(&self, convention: NumberConvention) -> SimulationResult {
        calculate_simulation(self.to_input_with(convention))
    }
}
