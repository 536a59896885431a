use gridchart::core::format_tick_value;

#[test]
fn millions_and_thousands_are_abbreviated_to_one_decimal() {
    assert_eq!(format_tick_value(1_500_000.0), "1.5M");
    assert_eq!(format_tick_value(2_000_000.0), "2.0M");
    assert_eq!(format_tick_value(1_500.0), "1.5K");
    assert_eq!(format_tick_value(-2_500.0), "-2.5K");
}

#[test]
fn small_integers_are_unformatted() {
    assert_eq!(format_tick_value(3.0), "3");
    assert_eq!(format_tick_value(0.0), "0");
    assert_eq!(format_tick_value(-40.0), "-40");
    assert_eq!(format_tick_value(999.0), "999");
}

#[test]
fn fractions_keep_one_decimal() {
    assert_eq!(format_tick_value(2.5), "2.5");
    assert_eq!(format_tick_value(-0.5), "-0.5");
}
