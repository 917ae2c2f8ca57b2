use super::*;

#[test]
fn linear_map_matches_endpoints() {
    assert_eq!(linear_map(-32.0, -32.0, 32.0, -1.0, 1.0), -1.0);
    assert_eq!(linear_map(0.0, -32.0, 32.0, -1.0, 1.0), 0.0);
    assert_eq!(linear_map(32.0, -32.0, 32.0, -1.0, 1.0), 1.0);
    assert_eq!(linear_map(5.0, 2.0, 2.0, 7.0, 9.0), 7.0);
}

#[test]
fn fract01_is_in_unit_range() {
    for x in [-3.75, -0.0, 0.25, 12.5, 1e6 + 0.125] {
        let f = fract01(x);
        assert!((0.0..1.0).contains(&f), "{x} -> {f}");
    }
    assert!((fract01(-3.75) - 0.25).abs() < 1e-12);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
    assert_eq!(add_sat_u8(200, 100), 255);
}
