/// Compact value-axis label: `1.5M`, `2.0K`, `3`, `2.5`.
#[must_use]
pub fn format_tick_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        // normalize `-0.0`
        let value = if value == 0.0 { 0.0 } else { value };
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_tick_value;

    #[test]
    fn abbreviates_large_magnitudes() {
        assert_eq!(format_tick_value(1_500_000.0), "1.5M");
        assert_eq!(format_tick_value(-2_000.0), "-2.0K");
        assert_eq!(format_tick_value(999.0), "999");
    }

    #[test]
    fn keeps_integers_bare_and_fractions_to_one_decimal() {
        assert_eq!(format_tick_value(3.0), "3");
        assert_eq!(format_tick_value(2.5), "2.5");
        assert_eq!(format_tick_value(-0.0), "0");
        assert_eq!(format_tick_value(1.26), "1.3");
    }
}
