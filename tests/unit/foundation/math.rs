use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u8(200, 153), 120);
}

#[test]
fn unit_to_u8_clamps() {
    assert_eq!(unit_to_u8(-1.0), 0);
    assert_eq!(unit_to_u8(0.6), 153);
    assert_eq!(unit_to_u8(4.0), 255);
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![200, 100, 50, 0, 255, 128, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 128, 64, 0, 128]);
}
