//! The result card of the simulator as plain data.
//!
//! A presentation layer can render [`SimulationReport::lines`] however it likes; text and
//! JSON renderings are provided for terminals and web front ends.

use serde::{Deserialize, Serialize};

use crate::format::{format_currency, format_months};
use crate::{SimulationInput, SimulationResult};

/// Shown under the results. The values are a reference, not a commercial proposal.
pub const DISCLAIMER: &str = "Este cálculo utiliza valores e taxas de mercado apenas como referência, sem validade para propostas comerciais.";

/// A labelled, already formatted result value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub label: String,
    pub value: String,
    /// Set on the headline figure of the card.
    pub emphasis: bool,
}

impl ReportLine {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
            emphasis: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub lines: Vec<ReportLine>,
    pub disclaimer: String,
}

impl SimulationReport {
    pub fn new(input: &SimulationInput, result: &SimulationResult) -> Self {
        let lines = vec![
            ReportLine::new("Valor da operação", format_currency(result.operation_value)),
            ReportLine::new("Prazo", format_months(input.term_months)),
            ReportLine::new("Valor recibo de aluguel", format_currency(result.rent_receipt_value)),
            ReportLine::new("Créditos Pis e Cofins", format_currency(result.pis_cofins_credit)),
            ReportLine::new(
                "Vlr liq alug Pis Cofins rec",
                format_currency(result.net_rent_after_pis_cofins),
            ),
            ReportLine::new("Redução do I.R.", format_currency(result.income_tax_reduction)),
            ReportLine::new("Valor líquido do aluguel", format_currency(result.net_rent_value)),
            ReportLine {
                emphasis: true,
                ..ReportLine::new(
                    "Investimento Líquido Total",
                    format_currency(result.total_net_investment),
                )
            },
        ];

        Self {
            lines,
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    /// One `label: value` row per line with the values right-aligned.
    pub fn render_text(&self) -> String {
        let label_width = self
            .lines
            .iter()
            .map(|line| line.label.chars().count())
            .max()
            .unwrap_or(0);
        let value_width = self
            .lines
            .iter()
            .map(|line| line.value.chars().count())
            .max()
            .unwrap_or(0);

        let mut output = String::new();
        for line in &self.lines {
            let padding = label_width - line.label.chars().count();
            output.push_str(&format!(
                "{}:{} {:>value_width$}\n",
                line.label,
                " ".repeat(padding),
                line.value,
            ));
        }
        output.push('\n');
        output.push_str(&self.disclaimer);
        output.push('\n');
        output
    }

    pub fn to_json(&self) -> Result<String, anyhow::Error> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize simulation report: {e}"))
    }
}
