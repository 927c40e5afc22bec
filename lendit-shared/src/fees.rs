/// Contract fee computation
///
/// The total fee of a contract is the item's daily rate multiplied by the
/// contract length, rounded to whole cents with half-up rounding. This is a
/// pure function: invalid inputs (zero or negative lengths, negative rates)
/// are rejected upstream by request validation, never here.

/// Rounds a currency amount to two decimal places, half-up
///
/// Amounts in this system are non-negative, for which `f64::round`
/// (half away from zero) coincides with half-up.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Computes the total contract fee from length and daily rate
///
/// # Example
///
/// ```
/// use lendit_shared::fees::contract_fee;
///
/// assert_eq!(contract_fee(7, 26.95), 188.65);
/// ```
pub fn contract_fee(length_days: i32, item_rate: f64) -> f64 {
    round_to_cents(length_days as f64 * item_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_fee_reference_case() {
        assert_eq!(contract_fee(7, 26.95), 188.65);
    }

    #[test]
    fn test_contract_fee_whole_amounts() {
        assert_eq!(contract_fee(1, 10.0), 10.0);
        assert_eq!(contract_fee(3, 0.0), 0.0);
        assert_eq!(contract_fee(30, 1.5), 45.0);
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 3 * 0.125 = 0.375 -> 0.38
        assert_eq!(contract_fee(3, 0.125), 0.38);
        // 1 * 0.005 -> 0.01
        assert_eq!(round_to_cents(0.005), 0.01);
        assert_eq!(round_to_cents(0.004), 0.0);
    }

    #[test]
    fn test_round_to_cents_keeps_two_decimals() {
        assert_eq!(round_to_cents(188.649999), 188.65);
        assert_eq!(round_to_cents(12.344), 12.34);
        assert_eq!(round_to_cents(12.345), 12.35);
    }

    #[test]
    fn test_fee_scales_with_length() {
        let daily = contract_fee(1, 19.99);
        let weekly = contract_fee(7, 19.99);
        assert!(weekly > daily);
        assert_eq!(weekly, 139.93);
    }
}
