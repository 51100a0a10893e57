use super::*;

const RED: Rgba = Rgba::opaque(255, 0, 0);
const BLUE: Rgba = Rgba::opaque(0, 0, 255);

/// Left half white, right half blue, hard edge at `split`.
fn two_regions(width: u32, height: u32, split: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(width, height, Rgba::WHITE);
    for y in 0..height {
        for x in split..width {
            buffer.put(x, y, BLUE);
        }
    }
    buffer
}

fn filled_positions(buffer: &PixelBuffer, color: Rgba) -> Vec<(u32, u32)> {
    let mut positions = Vec::new();
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if buffer.get(x, y) == color {
                positions.push((x, y));
            }
        }
    }
    positions
}

/// Horizontal gradient: column `x` has gray level `x * step`.
fn gradient(width: u32, height: u32, step: u8) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(width, height, Rgba::WHITE);
    for y in 0..height {
        for x in 0..width {
            let level = (x as u8).saturating_mul(step);
            buffer.put(x, y, Rgba::opaque(level, level, level));
        }
    }
    buffer
}

#[test]
fn fills_only_the_clicked_region() {
    let mut buffer = two_regions(8, 6, 4);
    let outcome = flood_fill(&mut buffer, 1, 1, RED, 0);
    assert_eq!(outcome, FillOutcome::Filled { pixels: 24 });
    for y in 0..6 {
        for x in 0..8 {
            let expected = if x < 4 { RED } else { BLUE };
            assert_eq!(buffer.get(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn out_of_range_seed_leaves_buffer_untouched() {
    let mut buffer = two_regions(4, 4, 2);
    let before = buffer.clone();
    assert_eq!(flood_fill(&mut buffer, -1, 0, RED, 5), FillOutcome::OutOfRange);
    assert_eq!(flood_fill(&mut buffer, 4, 0, RED, 5), FillOutcome::OutOfRange);
    assert_eq!(flood_fill(&mut buffer, 0, 4, RED, 5), FillOutcome::OutOfRange);
    assert_eq!(buffer, before);
}

#[test]
fn seed_matching_fill_color_is_a_no_op() {
    let mut buffer = PixelBuffer::new(4, 4, Rgba::opaque(2, 2, 2));
    let before = buffer.clone();
    assert_eq!(fill_pixels(&mut buffer, 1, 1, FillOptions::new(Rgba::BLACK)), FillOutcome::SameColor);
    assert_eq!(buffer, before);
}

#[test]
fn same_color_check_ignores_alpha() {
    let mut buffer = PixelBuffer::new(2, 2, Rgba::new(0, 0, 0, 0));
    assert_eq!(flood_fill(&mut buffer, 0, 0, Rgba::BLACK, 0), FillOutcome::SameColor);
}

#[test]
fn tolerance_compares_against_seed_not_neighbors() {
    // Each column is 3 levels brighter than the previous one; with tolerance 4
    // chaining neighbor-to-neighbor would bleed across the whole row.
    let mut buffer = gradient(10, 1, 3);
    let outcome = flood_fill(&mut buffer, 0, 0, RED, 4);
    assert_eq!(outcome, FillOutcome::Filled { pixels: 2 });
    assert_eq!(buffer.get(2, 0), Rgba::opaque(6, 6, 6));
}

#[test]
fn larger_tolerance_never_shrinks_region() {
    let source = gradient(40, 3, 2);
    let mut previous: Option<Vec<(u32, u32)>> = None;
    for tolerance in [0u8, 1, 3, 5, 10, 20, 60] {
        let mut buffer = source.clone();
        flood_fill(&mut buffer, 5, 1, RED, tolerance);
        let region = filled_positions(&buffer, RED);
        if let Some(smaller) = &previous {
            assert!(smaller.iter().all(|p| region.contains(p)), "tolerance {tolerance}");
        }
        previous = Some(region);
    }
}

#[test]
fn fill_keeps_fill_alpha() {
    let mut buffer = PixelBuffer::new(3, 3, Rgba::WHITE);
    let translucent = Rgba::new(255, 0, 0, 100);
    flood_fill(&mut buffer, 0, 0, translucent, 0);
    assert_eq!(buffer.count_color(translucent), 9);
}

#[test]
fn whole_white_buffer_becomes_black() {
    let mut buffer = PixelBuffer::new(10, 10, Rgba::WHITE);
    let outcome = fill_pixels(&mut buffer, 5, 5, FillOptions::new(Rgba::BLACK));
    assert_eq!(outcome, FillOutcome::Filled { pixels: 100 });
    assert_eq!(buffer.count_color(Rgba::BLACK), 100);
}

#[test]
fn dilation_closes_anti_aliased_seam() {
    // A one-pixel gray edge between the white region and a blue wall.
    let mut buffer = two_regions(6, 4, 4);
    for y in 0..4 {
        buffer.put(3, y, Rgba::opaque(128, 128, 200));
    }
    let outcome = fill_pixels(&mut buffer, 0, 0, FillOptions::new(RED));
    assert_eq!(outcome, FillOutcome::Filled { pixels: 12 });
    for y in 0..4 {
        assert_eq!(buffer.get(3, y), RED, "seam at row {y}");
        assert_eq!(buffer.get(4, y), BLUE);
    }
}

#[test]
fn zero_expand_skips_dilation() {
    let mut buffer = two_regions(6, 2, 3);
    let options = FillOptions {
        color: RED,
        tolerance: 0,
        expand_px: 0,
    };
    fill_pixels(&mut buffer, 0, 0, options);
    assert_eq!(buffer.count_color(RED), 6);
}

#[test]
fn full_hd_fill_covers_every_pixel() {
    let mut buffer = PixelBuffer::new(1920, 1080, Rgba::WHITE);
    assert_eq!(
        flood_fill(&mut buffer, 960, 540, Rgba::BLACK, 0),
        FillOutcome::Filled {
            pixels: 1920 * 1080
        }
    );
    assert_eq!(buffer.count_color(Rgba::BLACK), 1920 * 1080);
}
