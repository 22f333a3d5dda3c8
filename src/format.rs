//! pt-BR display formatting for the simulator results.
//!
//! Values are rounded here and only here; the calculation keeps full precision.

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats a value as Brazilian real: `R$ 1.234,56`, negatives as `-R$ 1.234,56`.
///
/// The symbol is followed by a no-break space (U+00A0), as browsers print pt-BR currency.
pub fn format_currency(value: Decimal) -> String {
    let (negative, digits) = localize(value, 2);
    format!("{}R$\u{a0}{}", if negative { "-" } else { "" }, digits)
}

/// Formats a value with five fraction digits and a literal `%`: `2,50000%`.
pub fn format_percent(value: Decimal) -> String {
    let (negative, digits) = localize(value, 5);
    format!("{}{}%", if negative { "-" } else { "" }, digits)
}

/// Formats the term line of the result card: `60 meses`.
pub fn format_months(value: Decimal) -> String {
    format!("{} meses", value.normalize())
}

/// Rounds half away from zero and applies pt-BR separators to the absolute value.
///
/// The sign is reported separately so that a value rounding to zero never prints `-0`.
fn localize(value: Decimal, fraction_digits: u32) -> (bool, String) {
    let rounded =
        value.round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    // Padding through `{:.N}` overflows rust_decimal's fixed buffer near Decimal::MAX.
    let plain = rounded.abs().to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

    let mut localized = group_thousands(integer);
    if fraction_digits > 0 {
        localized.push(',');
        localized.push_str(fraction);
        let padding = (fraction_digits as usize).saturating_sub(fraction.len());
        localized.extend(std::iter::repeat_n('0', padding));
    }

    (negative, localized)
}

fn group_thousands(integer: &str) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
