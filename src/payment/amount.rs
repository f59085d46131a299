//! Rupee amounts to integer paise.
//!
//! Amounts arrive as JSON numbers or numeric strings. Conversion works on the
//! decimal text rather than `f64` so `10.005` rounds to `1001`, half up on the
//! third decimal.

use serde_json::Value;

use super::PaymentError;

/// Largest decimal shift accepted before the value is certainly out of range.
const MAX_SCALE: i64 = 24;

/// Convert a rupee amount into paise.
///
/// # Errors
/// `InvalidAmount` for non-numeric input, negative values, and anything that
/// rounds to zero paise or overflows `u64`.
pub fn to_paise(amount: &Value) -> Result<u64, PaymentError> {
    let text = match amount {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return Err(PaymentError::InvalidAmount),
    };
    let paise = parse_paise(&text).ok_or(PaymentError::InvalidAmount)?;
    if paise == 0 {
        return Err(PaymentError::InvalidAmount);
    }
    Ok(paise)
}

fn parse_paise(text: &str) -> Option<u64> {
    let text = text.strip_prefix('+').unwrap_or(text);
    if text.starts_with('-') {
        return None;
    }

    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes())
        .map(|b| b - b'0')
        .collect();
    // Index of the first digit past the paise position.
    let cut = i64::try_from(whole.len()).ok()?.checked_add(exponent)?.checked_add(2)?;
    if cut > i64::try_from(digits.len()).ok()? + MAX_SCALE {
        return None;
    }

    let mut paise: u64 = 0;
    for index in 0..cut.max(0) {
        let digit = usize::try_from(index)
            .ok()
            .and_then(|index| digits.get(index).copied())
            .unwrap_or(0);
        paise = paise.checked_mul(10)?.checked_add(u64::from(digit))?;
    }

    let round_digit = usize::try_from(cut)
        .ok()
        .and_then(|index| digits.get(index).copied())
        .unwrap_or(0);
    if round_digit >= 5 {
        paise = paise.checked_add(1)?;
    }
    Some(paise)
}
