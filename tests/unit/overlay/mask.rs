use super::*;

#[test]
fn corners_are_transparent_and_interior_opaque() {
    let mask = rounded_rect_mask(Canvas::new(100, 50), 12);
    assert_eq!(mask.dimensions(), (100, 50));
    for (x, y) in [(0, 0), (99, 0), (0, 49), (99, 49)] {
        assert_eq!(mask.get_pixel(x, y).0[0], 0, "corner ({x},{y})");
    }
    for (x, y) in [(50, 25), (50, 0), (0, 25), (99, 25), (12, 12)] {
        assert_eq!(mask.get_pixel(x, y).0[0], 255, "pixel ({x},{y})");
    }
}

#[test]
fn corner_arc_is_antialiased() {
    let mask = rounded_rect_mask(Canvas::new(100, 50), 12);
    // The arc crosses the diagonal of the corner box near (3.5, 3.5).
    let partial = (0..12)
        .map(|i| mask.get_pixel(i, i).0[0])
        .filter(|v| *v > 0 && *v < 255)
        .count();
    assert!(partial >= 1);
}

#[test]
fn mask_is_symmetric() {
    let mask = rounded_rect_mask(Canvas::new(40, 30), 9);
    for y in 0..30 {
        for x in 0..40 {
            let v = mask.get_pixel(x, y).0[0];
            assert_eq!(v, mask.get_pixel(39 - x, y).0[0]);
            assert_eq!(v, mask.get_pixel(x, 29 - y).0[0]);
        }
    }
}

#[test]
fn zero_radius_is_fully_opaque() {
    let mask = rounded_rect_mask(Canvas::new(8, 8), 0);
    assert!(mask.pixels().all(|p| p.0[0] == 255));
}

#[test]
fn oversized_radius_is_clamped_to_half_the_short_side() {
    let mask = rounded_rect_mask(Canvas::new(60, 20), 500);
    assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    assert_eq!(mask.get_pixel(30, 10).0[0], 255);
    // Pill shape: the middle of the left edge is on the arc, not cut away.
    assert!(mask.get_pixel(0, 10).0[0] > 0);
}

#[test]
fn apply_mask_scales_alpha_only() {
    let mut img = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 200]));
    let mut mask = GrayImage::from_pixel(4, 4, Luma([255]));
    mask.put_pixel(0, 0, Luma([0]));
    mask.put_pixel(1, 0, Luma([128]));
    apply_mask(&mut img, &mask).unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 0]);
    assert_eq!(img.get_pixel(1, 0).0, [10, 20, 30, 100]);
    assert_eq!(img.get_pixel(2, 2).0, [10, 20, 30, 200]);
}

#[test]
fn apply_mask_rejects_size_mismatch() {
    let mut img = RgbaImage::new(4, 4);
    let mask = GrayImage::new(3, 4);
    assert!(matches!(
        apply_mask(&mut img, &mask),
        Err(ReelError::Composition(_))
    ));
}
