//! `br_lease_simulator` is a Rust library for evaluating equipment leasing operations in Brazil.
//!
//! Given the value of the asset, the term in months, the monthly bank rate and any extra
//! expenses, it computes the monthly rent receipt (a fixed Price-table payment) and how much
//! of it remains once the tax effects of the lease are applied:
//! - **PIS/COFINS credits** of 9.25% on the rent receipt.
//! - **Income tax (IR) reduction** of 34% on the rent net of PIS/COFINS.
//!
//! ## Usage
//!
//! The form fields are free text, exactly as typed by the user. Build a
//! [`SimulationForm`], then calculate and format the results:
//!
//! ```rust
//! use br_lease_simulator::{format_currency, Field, SimulationForm};
//!
//! let form = SimulationForm::default()
//!     .with_field(Field::AssetValue, "1000")
//!     .with_field(Field::TermMonths, "10")
//!     .with_field(Field::BankRate, "0");
//!
//! let result = form.calculate();
//! assert_eq!(format_currency(result.rent_receipt_value), "R$\u{a0}100,00");
//! ```
//!
//! Already-parsed values go straight to [`calculate_simulation`]:
//!
//! ```rust
//! use br_lease_simulator::{calculate_simulation, SimulationInput};
//! use rust_decimal_macros::dec;
//!
//! let result = calculate_simulation(SimulationInput {
//!     asset_value: dec!(50_000_000),
//!     term_months: dec!(60),
//!     bank_rate: dec!(2.5),
//!     iof: dec!(0),
//!     extra_expenses: dec!(0),
//! });
//!
//! assert_eq!(result.rent_receipt_value.round_dp(2), dec!(1617669.80));
//! ```

pub mod format;
pub mod input;
pub mod report;

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use format::{format_currency, format_months, format_percent};
pub use input::{Field, NumberConvention, SimulationForm, parse_number, parse_number_with, sanitize};
pub use report::{ReportLine, SimulationReport};

/// PIS/COFINS credit rate applied to the rent receipt.
pub const PIS_COFINS_RATE: Decimal = dec!(0.0925);

/// Income tax (IR) reduction rate applied to the rent net of PIS/COFINS.
pub const INCOME_TAX_RATE: Decimal = dec!(0.34);

/// Parsed values of the simulator form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Value of the leased asset.
    pub asset_value: Decimal,
    /// Number of monthly installments.
    pub term_months: Decimal,
    /// Monthly bank rate as a percentage (e.g., 2.5 for 2.5%).
    pub bank_rate: Decimal,
    /// IOF percentage. Collected by the form but not part of any result yet.
    pub iof: Decimal,
    /// Expenses financed together with the asset.
    pub extra_expenses: Decimal,
}

/// Everything the simulator derives from one [`SimulationInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Asset value plus extra expenses.
    pub operation_value: Decimal,
    /// Fixed monthly payment on the operation value.
    pub rent_receipt_value: Decimal,
    pub pis_cofins_credit: Decimal,
    pub net_rent_after_pis_cofins: Decimal,
    pub income_tax_reduction: Decimal,
    /// Monthly rent left after both tax effects.
    pub net_rent_value: Decimal,
    /// Net rent over the whole term.
    pub total_net_investment: Decimal,
}

/// Calculates the fixed periodic payment that repays `present_value` over `periods`.
///
/// The Price table formula is: PMT = PV * [i(1 + i)^n] / [(1 + i)^n – 1]
///
/// # Arguments
///
/// * `rate_percent` - The rate per period as a percentage (e.g., 2.5 for 2.5%).
/// * `periods` - The number of payments.
/// * `present_value` - The amount financed.
///
/// A zero rate splits the amount evenly across the periods.
///
/// Decimal resolution is 28 fraction digits, so a payment smaller than `1e-28` (a principal
/// near that floor) rounds to zero even when the rate, periods and amount are all positive.
///
/// # Errors
///
/// Returns an error if `periods` is not positive or `rate_percent` is negative.
pub fn calculate_payment(
    rate_percent: Decimal,
    periods: Decimal,
    present_value: Decimal,
) -> Result<Decimal, anyhow::Error> {
    if periods <= Decimal::ZERO {
        return Err(anyhow::anyhow!("Number of periods must be greater than zero."));
    }
    if rate_percent < Decimal::ZERO {
        return Err(anyhow::anyhow!("Interest rate cannot be negative."));
    }
    if rate_percent.is_zero() {
        return Ok(straight_line(present_value, periods));
    }

    let rate = rate_percent / dec!(100);

    // Same formula divided through by (1 + i)^n: PMT = PV * i / [1 - (1 + i)^-n].
    // A growth factor past the Decimal range leaves the interest-only payment.
    let discount = match (Decimal::ONE + rate).checked_powd(periods) {
        Some(growth) => Decimal::ONE / growth,
        None => Decimal::ZERO,
    };
    let annuity_factor = Decimal::ONE - discount;

    // Rate too small to register over this term.
    if annuity_factor.is_zero() {
        return Ok(straight_line(present_value, periods));
    }

    let interest = present_value.saturating_mul(rate);
    Ok(interest
        .checked_div(annuity_factor)
        .unwrap_or_else(|| saturated(interest)))
}

/// Runs the whole simulation: payment, PIS/COFINS credit, IR reduction and totals.
///
/// This never fails. A non-positive term yields a zero rent receipt and zero for every
/// value derived from it.
pub fn calculate_simulation(input: SimulationInput) -> SimulationResult {
    let operation_value = input.asset_value.saturating_add(input.extra_expenses);

    let rent_receipt_value = if input.term_months > Decimal::ZERO {
        match calculate_payment(input.bank_rate, input.term_months, operation_value) {
            Ok(payment) => payment,
            Err(err) => {
                warn!(
                    %err,
                    bank_rate = %input.bank_rate,
                    "rent receipt not computable, using zero"
                );
                Decimal::ZERO
            }
        }
    } else {
        Decimal::ZERO
    };

    let pis_cofins_credit = rent_receipt_value.saturating_mul(PIS_COFINS_RATE);
    let net_rent_after_pis_cofins = rent_receipt_value.saturating_sub(pis_cofins_credit);
    let income_tax_reduction = net_rent_after_pis_cofins.saturating_mul(INCOME_TAX_RATE);
    let net_rent_value = net_rent_after_pis_cofins.saturating_sub(income_tax_reduction);
    let total_net_investment = net_rent_value.saturating_mul(input.term_months);

    debug!(
        %operation_value,
        term_months = %input.term_months,
        %rent_receipt_value,
        %net_rent_value,
        "simulation calculated"
    );

    SimulationResult {
        operation_value,
        rent_receipt_value,
        pis_cofins_credit,
        net_rent_after_pis_cofins,
        income_tax_reduction,
        net_rent_value,
        total_net_investment,
    }
}

fn straight_line(present_value: Decimal, periods: Decimal) -> Decimal {
    present_value
        .checked_div(periods)
        .unwrap_or_else(|| saturated(present_value))
}

fn saturated(sign_of: Decimal) -> Decimal {
    if sign_of.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn input(asset_value: Decimal, term_months: Decimal, bank_rate: Decimal) -> SimulationInput {
        SimulationInput {
            asset_value,
            term_months,
            bank_rate,
            ..SimulationInput::default()
        }
    }

    #[test]
    fn test_calculate_simulation_happy_path() {
        let result = calculate_simulation(input(dec!(50000000), dec!(60), dec!(2.5)));

        assert_eq!(result.operation_value, dec!(50000000));
        assert_eq!(result.rent_receipt_value.round_dp(2), dec!(1617669.80));
        assert_eq!(result.pis_cofins_credit.round_dp(2), dec!(149634.46));
        assert_eq!(result.net_rent_after_pis_cofins.round_dp(2), dec!(1468035.34));
        assert_eq!(result.income_tax_reduction.round_dp(2), dec!(499132.02));
        assert_eq!(result.net_rent_value.round_dp(2), dec!(968903.32));
        assert_eq!(result.total_net_investment, result.net_rent_value * dec!(60));
        assert_eq!(result.total_net_investment.round_dp(0), dec!(58134199));
    }

    #[test]
    fn test_pipeline_applies_fixed_rates() {
        let result = calculate_simulation(input(dec!(50000000), dec!(60), dec!(2.5)));

        assert_eq!(
            result.pis_cofins_credit,
            result.rent_receipt_value * dec!(0.0925)
        );
        assert_eq!(
            result.income_tax_reduction,
            result.net_rent_after_pis_cofins * dec!(0.34)
        );
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    fn test_non_positive_term_zeroes_everything_downstream(#[case] term_months: Decimal) {
        for bank_rate in [dec!(0), dec!(2.5)] {
            let result = calculate_simulation(input(dec!(1000), term_months, bank_rate));

            assert_eq!(result.operation_value, dec!(1000));
            assert_eq!(result.rent_receipt_value, Decimal::ZERO);
            assert_eq!(result.pis_cofins_credit, Decimal::ZERO);
            assert_eq!(result.net_rent_after_pis_cofins, Decimal::ZERO);
            assert_eq!(result.income_tax_reduction, Decimal::ZERO);
            assert_eq!(result.net_rent_value, Decimal::ZERO);
            assert_eq!(result.total_net_investment, Decimal::ZERO);
        }
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let result = calculate_simulation(input(dec!(1000), dec!(10), dec!(0)));
        assert_eq!(result.rent_receipt_value, dec!(100));
    }

    #[test]
    fn test_extra_expenses_are_financed() {
        let result = calculate_simulation(SimulationInput {
            extra_expenses: dec!(500),
            ..input(dec!(1000), dec!(10), dec!(0))
        });

        assert_eq!(result.operation_value, dec!(1500));
        assert_eq!(result.rent_receipt_value, dec!(150));
    }

    #[test]
    fn test_iof_does_not_change_results() {
        let base = input(dec!(250000), dec!(36), dec!(1.8));
        let with_iof = SimulationInput {
            iof: dec!(0.38),
            ..base
        };

        assert_eq!(calculate_simulation(base), calculate_simulation(with_iof));
    }

    #[test]
    fn test_calculate_payment_matches_price_table() {
        // 12000 over 12 months at 1% per month.
        let payment = calculate_payment(dec!(1), dec!(12), dec!(12000)).unwrap();
        assert_eq!(payment.round_dp(2), dec!(1066.19));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn test_calculate_payment_zero_periods_error(#[case] periods: Decimal) {
        assert!(calculate_payment(dec!(2.5), periods, dec!(1000)).is_err());
        assert!(calculate_payment(dec!(0), periods, dec!(1000)).is_err());
    }

    #[test]
    fn test_calculate_payment_negative_rate_error() {
        assert!(calculate_payment(dec!(-2), dec!(12), dec!(1000)).is_err());
    }

    #[test]
    fn test_calculate_payment_long_term_tends_to_interest_only() {
        let payment = calculate_payment(dec!(10), dec!(100000), dec!(1000)).unwrap();
        assert_eq!(payment.round_dp(6), dec!(100));
    }

    #[test]
    fn test_calculate_payment_below_decimal_resolution_rounds_to_zero() {
        let smallest = Decimal::new(1, 28);

        assert_eq!(calculate_payment(dec!(1), dec!(12), smallest).unwrap(), Decimal::ZERO);
        assert!(calculate_payment(dec!(1), dec!(12), Decimal::new(1, 20)).unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_calculate_payment_huge_amount_saturates() {
        let payment = calculate_payment(dec!(50), dec!(1), Decimal::MAX).unwrap();
        assert_eq!(payment, Decimal::MAX);
    }

    #[test]
    fn test_default_form_reproduces_reference_scenario() {
        let from_form = SimulationForm::default().calculate();
        let direct = calculate_simulation(input(dec!(50000000), dec!(60), dec!(2.5)));

        assert_eq!(from_form, direct);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_rate_divides_evenly(amount in 0u64..10_000_000_000, periods in 1u32..600) {
            let pv = Decimal::from(amount);
            let n = Decimal::from(periods);
            prop_assert_eq!(calculate_payment(Decimal::ZERO, n, pv).unwrap(), pv / n);
        }

        #[test]
        fn prop_payment_positive_and_increasing_in_amount(
            amount in 1u64..1_000_000_000,
            extra in 1u64..1_000_000,
            rate_bps in 1u32..5_000,
            periods in 1u32..480,
        ) {
            let rate = Decimal::new(rate_bps.into(), 2);
            let n = Decimal::from(periods);
            let smaller = calculate_payment(rate, n, Decimal::from(amount)).unwrap();
            let larger = calculate_payment(rate, n, Decimal::from(amount + extra)).unwrap();

            prop_assert!(smaller > Decimal::ZERO);
            prop_assert!(larger > smaller);
        }

        #[test]
        fn prop_recalculation_is_identical(
            amount in 0u64..1_000_000_000,
            periods in 0u32..480,
            rate_bps in 0u32..5_000,
        ) {
            let rate = Decimal::new(rate_bps.into(), 2);
            let input = input(Decimal::from(amount), Decimal::from(periods), rate);
            prop_assert_eq!(calculate_simulation(input), calculate_simulation(input));
        }

        #[test]
        fn prop_each_tax_stage_reduces_rent(
            amount in 1u64..1_000_000_000,
            periods in 1u32..480,
            rate_bps in 0u32..5_000,
        ) {
            let rate = Decimal::new(rate_bps.into(), 2);
            let result =
                calculate_simulation(input(Decimal::from(amount), Decimal::from(periods), rate));

            prop_assert!(result.rent_receipt_value > Decimal::ZERO);
            prop_assert!(result.net_rent_after_pis_cofins < result.rent_receipt_value);
            prop_assert!(result.net_rent_value < result.net_rent_after_pis_cofins);
        }

        #[test]
        fn prop_sanitized_text_parses_non_negative(raw in "[^-]*") {
            prop_assert!(parse_number(&sanitize(&raw)) >= Decimal::ZERO);
        }
    }
}
