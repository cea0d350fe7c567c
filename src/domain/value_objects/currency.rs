/// Converts a decimal currency string into its integer cents text.
///
/// Fractional digits beyond two are truncated, never rounded. Input without a
/// decimal point is read as whole units. Empty input stays empty. The function
/// does not reject signs or non-numeric text; validation runs before it.
pub fn to_cents(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut parts = input.split('.');
    let whole = parts.next().unwrap_or_default();
    let Some(fraction) = parts.next() else {
        return format!("{}00", input);
    };

    let mut cents: String = fraction.chars().take(2).collect();
    while cents.chars().count() < 2 {
        cents.push('0');
    }

    format!("{}{}", whole, cents)
}

/// Renders stored cents as the decimal text shown in the edit form.
pub fn cents_to_display(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_fractions() {
        assert_eq!(to_cents("12.5"), "1250");
        assert_eq!(to_cents("12."), "1200");
        assert_eq!(to_cents("9.5"), "950");
    }

    #[test]
    fn truncates_long_fractions_without_rounding() {
        assert_eq!(to_cents("12.345"), "1234");
        assert_eq!(to_cents("0.999"), "099");
        assert_eq!(to_cents("19.99"), "1999");
    }

    #[test]
    fn whole_units_get_two_zero_digits() {
        assert_eq!(to_cents("12"), "1200");
        assert_eq!(to_cents("0"), "000");
    }

    #[test]
    fn empty_input_is_left_alone() {
        assert_eq!(to_cents(""), "");
    }

    #[test]
    fn sign_and_extra_points_pass_through() {
        assert_eq!(to_cents("-3.1"), "-310");
        assert_eq!(to_cents("1.2.3"), "120");
        assert_eq!(to_cents(".5"), "50");
    }

    #[test]
    fn normalized_output_never_contains_a_point() {
        for input in ["1.", "1.0", "1.05", "123.456789", "7"] {
            let cents = to_cents(input);
            let whole = input.split('.').next().unwrap();
            assert!(!cents.contains('.'), "{input} -> {cents}");
            assert_eq!(cents.len(), whole.len() + 2, "{input} -> {cents}");
            assert!(cents.starts_with(whole));
        }
    }

    #[test]
    fn display_round_trips_through_to_cents() {
        for cents in [0_i64, 5, 950, 1999, 100_000] {
            let shown = cents_to_display(cents);
            assert_eq!(to_cents(&shown).parse::<i64>().unwrap(), cents, "{shown}");
        }
        assert_eq!(cents_to_display(-5), "-0.05");
        assert_eq!(cents_to_display(950), "9.50");
    }
}
